//! Scripted node fixtures
//!
//! [`ScriptedNode`] answers from a [`SimulatedNode`] and then lets the test
//! rewrite the response, so misbehaving servers can be described as a
//! closure over the correct answer.

use addresses_deprecation::errors::{RpcError, RpcResult};
use addresses_deprecation::rpc::{NodeHandle, SimulatedNode};
use addresses_deprecation::types::NodeConfig;
use bitcoin::Network;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rewrites the `call`-th (0-based) correct response
pub type Rewrite = Box<dyn Fn(usize, Value) -> RpcResult<Value> + Send + Sync>;

pub struct ScriptedNode {
    name: String,
    inner: SimulatedNode,
    calls: AtomicUsize,
    rewrite: Rewrite,
}

impl ScriptedNode {
    pub fn new<F>(config: NodeConfig, rewrite: F) -> Self
    where
        F: Fn(usize, Value) -> RpcResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: format!("scripted {}", config.label()),
            inner: SimulatedNode::new(config, Network::Regtest),
            calls: AtomicUsize::new(0),
            rewrite: Box::new(rewrite),
        }
    }

    /// Number of decodes served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NodeHandle for ScriptedNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> NodeConfig {
        self.inner.config()
    }

    async fn decode_raw_transaction(&self, hex: &str) -> RpcResult<Value> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let decoded = self.inner.decode(hex)?;
        (self.rewrite)(call, decoded)
    }
}

/// Mutable access to `vout[index].scriptPubKey`
pub fn script_pubkey_mut(decoded: &mut Value, index: usize) -> &mut serde_json::Map<String, Value> {
    decoded["vout"][index]["scriptPubKey"]
        .as_object_mut()
        .expect("scriptPubKey object")
}

/// Error a node returns for a call it cannot serve
pub fn call_failed(message: &str) -> RpcError {
    RpcError::CallFailed {
        method: "decoderawtransaction".to_string(),
        message: message.to_string(),
    }
}
