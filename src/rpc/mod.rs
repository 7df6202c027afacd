//! Node fixture access
//!
//! - **NodeHandle** - the one operation the harness needs from a fixture
//! - **Client** - live node over JSON-RPC (`corepc-client`), blocking calls under a timeout
//! - **Simulated** - in-process fixture answering decodes without a node
//! - **Timeout** - `spawn_blocking` + timeout wrapper used by the client

pub mod client;
pub mod simulated;
pub mod timeout;

use crate::errors::RpcResult;
use crate::types::NodeConfig;
use serde_json::Value;
use std::future::Future;

pub use client::RpcNode;
pub use simulated::{LegacyEmission, SimulatedNode};
pub use timeout::execute_with_timeout;

/// A node fixture the harness can submit transactions to
///
/// Any failure is fatal to the run; implementations never retry.
pub trait NodeHandle: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Configuration the fixture was started with
    fn config(&self) -> NodeConfig;

    /// `decoderawtransaction(hex)`, returning the parsed JSON result
    fn decode_raw_transaction(&self, hex: &str)
        -> impl Future<Output = RpcResult<Value>> + Send;
}
