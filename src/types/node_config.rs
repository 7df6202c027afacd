//! Fixture configuration types
//!
//! A [`NodeConfig`] is fixed when a fixture process is launched and is passed
//! by value to everything that needs it. There is no process-wide flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Startup argument that opts a node into the legacy `reqSigs`/`addresses` fields
pub const DEPRECATED_ADDRESSES_ARG: &str = "-deprecatedrpc=addresses";

/// Configuration of one node fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeConfig {
    pub deprecated_addresses_enabled: bool,
}

impl NodeConfig {
    /// Fixture started without the deprecation flag
    pub const fn legacy_off() -> Self {
        Self {
            deprecated_addresses_enabled: false,
        }
    }

    /// Fixture started with `-deprecatedrpc=addresses`
    pub const fn legacy_on() -> Self {
        Self {
            deprecated_addresses_enabled: true,
        }
    }

    /// Short name used in logs and reports
    pub fn label(&self) -> &'static str {
        if self.deprecated_addresses_enabled {
            "legacy-on"
        } else {
            "legacy-off"
        }
    }

    /// Extra process arguments a launcher must pass for this configuration
    pub fn startup_args(&self) -> Vec<String> {
        if self.deprecated_addresses_enabled {
            vec![DEPRECATED_ADDRESSES_ARG.to_string()]
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which field rules the checker enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// Legacy fields are emitted only when the fixture opted in
    #[default]
    Deprecation,
    /// Legacy fields have been removed; neither fixture may emit them
    Retired,
}

impl GateMode {
    /// Whether `config` is expected to emit the legacy fields under this mode
    pub fn emits_legacy_fields(&self, config: NodeConfig) -> bool {
        match self {
            GateMode::Deprecation => config.deprecated_addresses_enabled,
            GateMode::Retired => false,
        }
    }
}
