use thiserror::Error;

/// Application-wide error type - single point of truth
///
/// Gate violations are not errors: they are collected into a
/// [`Report`](crate::types::Report). Everything here aborts a run.
#[derive(Error, Debug)]
pub enum AppError {
    /// Node fixture transport (connection, timeout, malformed response)
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Transaction construction from catalog scripts
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Script classification or derivation failure
    #[error("Script error: {0}")]
    Script(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// RPC error types
///
/// Every variant is a transport failure from the harness' point of view and
/// is fatal to the run. Nothing is retried.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Failed to establish connection to the node's RPC server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// RPC method call failed (covers network errors, authentication, etc.)
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// Failed to deserialise RPC response data
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// RPC request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// RPC returned unexpected or malformed response data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Decoded outputs do not line up positionally with the submitted transaction
    #[error("Output order mismatch: position {position} reported n={reported}")]
    OutputOrderMismatch { position: usize, reported: u64 },

    /// Decoded output count differs from the submitted transaction
    #[error("Output count mismatch: expected {expected}, decoded {actual}")]
    OutputCountMismatch { expected: usize, actual: usize },
}

/// Transaction construction errors
///
/// Catalog-supplied scripts never trigger these; seeing one means the
/// catalog itself is broken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A transaction needs at least one output to carry a script
    #[error("No outputs supplied")]
    NoOutputs,

    /// Script exceeds the consensus script size limit
    #[error("Output {index} script is {len} bytes (limit {limit})")]
    ScriptTooLarge {
        index: usize,
        len: usize,
        limit: usize,
    },

    /// Output value is above the money supply cap
    #[error("Output {index} value {value_sat} sat exceeds the money supply")]
    ValueOutOfRange { index: usize, value_sat: u64 },
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
