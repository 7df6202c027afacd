use crate::errors::{AppError, AppResult};
use crate::types::GateMode;
use bitcoin::Network;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Node started without `-deprecatedrpc=addresses`
    pub legacy_off: NodeRpcConfig,
    /// Node started with `-deprecatedrpc=addresses`
    pub legacy_on: NodeRpcConfig,
    pub harness: HarnessConfig,
}

/// RPC endpoint of a single node fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRpcConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
}

impl NodeRpcConfig {
    /// Defaults for the fixture started without the deprecation flag
    pub fn legacy_off_default() -> Self {
        Self {
            url: "http://127.0.0.1:18443".to_string(),
            ..Self::default()
        }
    }

    /// Defaults for the fixture started with the deprecation flag
    pub fn legacy_on_default() -> Self {
        Self {
            url: "http://127.0.0.1:18453".to_string(),
            ..Self::default()
        }
    }
}

impl Default for NodeRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:18443".to_string(),
            username: "bitcoin".to_string(),
            password: "password".to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Harness behaviour shared by both fixtures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Network used to encode expected addresses (bitcoin, testnet, signet, regtest)
    pub network: String,
    /// Value assigned to every catalog output
    pub output_value_sat: u64,
    /// Decode twice per fixture and require identical results
    pub verify_idempotence: bool,
    /// Treat the legacy fields as removed from the protocol entirely
    pub retired: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            network: "regtest".to_string(),
            output_value_sat: 10_000,
            verify_idempotence: true,
            retired: false,
        }
    }
}

impl HarnessConfig {
    /// Parse the configured network name
    pub fn network(&self) -> AppResult<Network> {
        Network::from_str(&self.network)
            .map_err(|e| AppError::Config(format!("Unknown network '{}': {}", self.network, e)))
    }

    /// Gate rules selected by the `retired` switch
    pub fn gate_mode(&self) -> GateMode {
        if self.retired {
            GateMode::Retired
        } else {
            GateMode::Deprecation
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            legacy_off: NodeRpcConfig::legacy_off_default(),
            legacy_on: NodeRpcConfig::legacy_on_default(),
            harness: HarnessConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Same as [`AppConfig::load`] with an explicit config file (extension optional)
    pub fn load_from(file_name: &str) -> Result<Self, ConfigError> {
        let off = NodeRpcConfig::legacy_off_default();
        let on = NodeRpcConfig::legacy_on_default();
        let harness = HarnessConfig::default();

        let config = Config::builder()
            .set_default("legacy_off.url", off.url)?
            .set_default("legacy_off.username", off.username)?
            .set_default("legacy_off.password", off.password)?
            .set_default("legacy_off.timeout_seconds", off.timeout_seconds)?
            .set_default("legacy_on.url", on.url)?
            .set_default("legacy_on.username", on.username)?
            .set_default("legacy_on.password", on.password)?
            .set_default("legacy_on.timeout_seconds", on.timeout_seconds)?
            .set_default("harness.network", harness.network)?
            .set_default("harness.output_value_sat", harness.output_value_sat)?
            .set_default("harness.verify_idempotence", harness.verify_idempotence)?
            .set_default("harness.retired", harness.retired)?
            // Load from config.toml if it exists
            .add_source(File::with_name(file_name).required(false))
            // ADDRDEP_LEGACY_ON__URL style overrides for any nested key
            .add_source(
                config::Environment::with_prefix("ADDRDEP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Short-hand environment variables for the two endpoints
        if let Ok(url) = env::var("LEGACY_OFF_RPC_URL") {
            app_config.legacy_off.url = url;
        }
        if let Ok(url) = env::var("LEGACY_ON_RPC_URL") {
            app_config.legacy_on.url = url;
        }

        app_config.validate()?;
        Ok(app_config)
    }

    /// Effective configuration as TOML, suitable for a config.toml
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to render configuration: {}", e)))
    }

    /// Reject configurations that cannot describe two separate fixtures
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.legacy_off.url == self.legacy_on.url {
            return Err(ConfigError::Message(format!(
                "legacy_off and legacy_on point at the same node ({}); the two fixtures must be separate processes",
                self.legacy_off.url
            )));
        }
        if self.legacy_off.timeout_seconds == 0 || self.legacy_on.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
