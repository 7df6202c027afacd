use crate::config::{AppConfig, NodeRpcConfig};
use crate::errors::{AppError, AppResult};
use crate::rpc::RpcNode;
use crate::types::NodeConfig;
use clap::Args;
use tracing::{error, info};

/// Test RPC connectivity to both fixtures
#[derive(Args)]
pub struct TestRpcCommand {
    /// RPC URL of the legacy-off node
    #[arg(long)]
    pub off_url: Option<String>,

    /// RPC URL of the legacy-on node
    #[arg(long)]
    pub on_url: Option<String>,

    /// RPC username for both nodes
    #[arg(long)]
    pub rpc_username: Option<String>,

    /// RPC password for both nodes
    #[arg(long)]
    pub rpc_password: Option<String>,
}

impl TestRpcCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing fixture RPC connections ===");

        let app_config = AppConfig::load()?;

        let fixtures = [
            (
                self.override_endpoint(app_config.legacy_off, &self.off_url),
                NodeConfig::legacy_off(),
            ),
            (
                self.override_endpoint(app_config.legacy_on, &self.on_url),
                NodeConfig::legacy_on(),
            ),
        ];

        let mut failures = 0;
        for (rpc_config, node_config) in fixtures {
            info!("Testing connection to {} at {}", node_config, rpc_config.url);
            println!(
                "{} ({}) expected startup args: {:?}",
                node_config,
                rpc_config.url,
                node_config.startup_args()
            );

            match RpcNode::connect(rpc_config, node_config).await {
                Ok(node) => match node.test_connection().await {
                    Ok(chain) => println!("  PASSED - chain {}", chain),
                    Err(e) => {
                        error!("RPC connection test failed: {}", e);
                        println!("  FAILED - {}", e);
                        failures += 1;
                    }
                },
                Err(e) => {
                    error!("Failed to connect: {}", e);
                    println!("  FAILED - {}", e);
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            println!("\nTroubleshooting tips:");
            println!("1. Check that both nodes are running");
            println!("2. Verify the RPC URLs are correct");
            println!("3. Ensure RPC credentials are valid");
            println!("4. Start the legacy-on node with -deprecatedrpc=addresses");
            return Err(AppError::Config(format!(
                "{} of 2 fixture connections failed",
                failures
            )));
        }

        Ok(())
    }

    fn override_endpoint(&self, mut config: NodeRpcConfig, url: &Option<String>) -> NodeRpcConfig {
        if let Some(url) = url {
            config.url = url.clone();
        }
        if let Some(username) = &self.rpc_username {
            config.username = username.clone();
        }
        if let Some(password) = &self.rpc_password {
            config.password = password.clone();
        }
        config
    }
}
