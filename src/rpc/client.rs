use crate::config::NodeRpcConfig;
use crate::errors::{RpcError, RpcResult};
use crate::rpc::{execute_with_timeout, NodeHandle};
use crate::types::NodeConfig;
use corepc_client::client_sync::{v28::Client, Auth};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// A live node fixture reached over JSON-RPC
///
/// The node's deprecation flag is fixed when its process is launched; the
/// caller states which configuration the endpoint was started with.
pub struct RpcNode {
    name: String,
    node_config: NodeConfig,
    rpc_config: NodeRpcConfig,
    client: Arc<Client>,
}

impl RpcNode {
    /// Create the client and verify the node answers before returning
    pub async fn connect(rpc_config: NodeRpcConfig, node_config: NodeConfig) -> RpcResult<Self> {
        let client = Self::create_sync_client(&rpc_config)?;
        let node = Self {
            name: node_config.label().to_string(),
            node_config,
            rpc_config,
            client,
        };

        node.test_connection().await.map_err(|e| {
            RpcError::ConnectionFailed(format!(
                "{} node at {} is not answering - check URL, credentials, and that it was started{}: {}",
                node.name,
                node.rpc_config.url,
                if node_config.deprecated_addresses_enabled {
                    " with -deprecatedrpc=addresses"
                } else {
                    ""
                },
                e
            ))
        })?;

        info!(
            "Connected to {} fixture at {}",
            node.name, node.rpc_config.url
        );
        Ok(node)
    }

    /// Round-trip a `getblockchaininfo` call
    pub async fn test_connection(&self) -> RpcResult<String> {
        let client = Arc::clone(&self.client);
        let timeout_seconds = self.rpc_config.timeout_seconds;

        execute_with_timeout(timeout_seconds, "getblockchaininfo", move || -> RpcResult<String> {
            let info = client
                .get_blockchain_info()
                .map_err(|e| RpcError::CallFailed {
                    method: "getblockchaininfo".to_string(),
                    message: e.to_string(),
                })?;
            debug!(
                "Node connection test successful - chain: {}, blocks: {}",
                info.chain, info.blocks
            );
            Ok(info.chain)
        })
        .await
    }

    pub fn url(&self) -> &str {
        &self.rpc_config.url
    }

    fn create_sync_client(config: &NodeRpcConfig) -> RpcResult<Arc<Client>> {
        let auth = Auth::UserPass(config.username.clone(), config.password.clone());
        let client = Client::new_with_auth(&config.url, auth).map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to create RPC client: {}", e))
        })?;

        Ok(Arc::new(client))
    }
}

impl NodeHandle for RpcNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> NodeConfig {
        self.node_config
    }

    async fn decode_raw_transaction(&self, hex: &str) -> RpcResult<Value> {
        let client = Arc::clone(&self.client);
        let timeout_seconds = self.rpc_config.timeout_seconds;
        let args = [json!(hex)];

        // Raw call so optional fields reach the checker exactly as sent
        execute_with_timeout(timeout_seconds, "decoderawtransaction", move || -> RpcResult<Value> {
            client
                .call::<Value>("decoderawtransaction", &args)
                .map_err(|e| RpcError::CallFailed {
                    method: "decoderawtransaction".to_string(),
                    message: e.to_string(),
                })
        })
        .await
        .inspect_err(|e| error!("decoderawtransaction failed on {}: {}", self.name, e))
    }
}
