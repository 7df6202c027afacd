use crate::cli::{format_report, OutputFormat};
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::gate::{Harness, HarnessSettings};
use crate::rpc::RpcNode;
use crate::types::NodeConfig;
use clap::Args;
use tracing::{error, info};

#[derive(Args)]
pub struct RunCommand {
    /// RPC URL of the node started without -deprecatedrpc=addresses (overrides config.toml)
    #[arg(long)]
    off_url: Option<String>,

    /// RPC URL of the node started with -deprecatedrpc=addresses (overrides config.toml)
    #[arg(long)]
    on_url: Option<String>,

    /// RPC username for both nodes (overrides config.toml)
    #[arg(long)]
    rpc_username: Option<String>,

    /// RPC password for both nodes (overrides config.toml)
    #[arg(long)]
    rpc_password: Option<String>,

    /// Network used to encode expected addresses (overrides config.toml)
    #[arg(long)]
    network: Option<String>,

    /// Expect the legacy fields to be gone from both nodes
    #[arg(long)]
    retired: bool,

    /// Skip the repeat-decode stability check
    #[arg(long)]
    no_idempotence: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    format: OutputFormat,
}

impl RunCommand {
    pub async fn run(&self) -> AppResult<bool> {
        info!("=== Legacy Address Field Gate - live nodes ===");

        let app_config = self.resolve_config()?;

        let settings = HarnessSettings::from_config(&app_config.harness)?;
        info!(
            "Gate mode {:?} on {} ({} outputs)",
            settings.mode,
            settings.network,
            settings.entries.len()
        );

        let (legacy_off, legacy_on) = tokio::try_join!(
            RpcNode::connect(app_config.legacy_off.clone(), NodeConfig::legacy_off()),
            RpcNode::connect(app_config.legacy_on.clone(), NodeConfig::legacy_on())
        )?;
        info!(
            "Fixtures ready: legacy-off at {}, legacy-on at {}",
            legacy_off.url(),
            legacy_on.url()
        );

        let report = Harness::new(settings).run(&legacy_off, &legacy_on).await?;
        println!("{}", format_report(&report, self.format)?);

        Ok(report.passed())
    }

    /// Loaded configuration with CLI overrides applied, validated as a whole
    ///
    /// A rejected configuration is fatal; falling back to defaults could
    /// point the gate at unrelated nodes.
    fn resolve_config(&self) -> AppResult<AppConfig> {
        let app_config = AppConfig::load().map_err(|e| {
            error!("Failed to load configuration: {}", e);
            AppError::Config(e.to_string())
        })?;
        info!("Configuration loaded successfully");

        let app_config = self.apply_overrides(app_config);
        app_config.validate()?;
        Ok(app_config)
    }

    fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.off_url {
            config.legacy_off.url = url.clone();
        }
        if let Some(url) = &self.on_url {
            config.legacy_on.url = url.clone();
        }
        if let Some(username) = &self.rpc_username {
            config.legacy_off.username = username.clone();
            config.legacy_on.username = username.clone();
        }
        if let Some(password) = &self.rpc_password {
            config.legacy_off.password = password.clone();
            config.legacy_on.password = password.clone();
        }
        if let Some(network) = &self.network {
            config.harness.network = network.clone();
        }
        if self.retired {
            config.harness.retired = true;
        }
        if self.no_idempotence {
            config.harness.verify_idempotence = false;
        }
        config
    }
}
