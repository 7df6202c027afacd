//! Deadline for blocking node calls
//!
//! The corepc client is synchronous, so each call runs on tokio's blocking
//! pool. Missing the deadline is final; nothing is retried.

use crate::errors::{RpcError, RpcResult};
use std::time::Duration;
use tokio::time::timeout;

/// Run `call` on the blocking pool and flatten the outcome into one `RpcResult`
///
/// `method` names the call in errors. An elapsed deadline becomes
/// [`RpcError::Timeout`] and a panicked task becomes [`RpcError::CallFailed`].
pub async fn execute_with_timeout<T, F>(timeout_seconds: u64, method: &str, call: F) -> RpcResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RpcResult<T> + Send + 'static,
{
    match timeout(
        Duration::from_secs(timeout_seconds),
        tokio::task::spawn_blocking(call),
    )
    .await
    {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(RpcError::CallFailed {
            method: method.to_string(),
            message: format!("blocking task failed: {}", join_error),
        }),
        Err(_) => Err(RpcError::Timeout {
            timeout_seconds,
            operation: method.to_string(),
        }),
    }
}
