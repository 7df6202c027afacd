use crate::cli::{format_report, OutputFormat};
use crate::config::HarnessConfig;
use crate::errors::AppResult;
use crate::gate::{Harness, HarnessSettings};
use crate::rpc::{LegacyEmission, SimulatedNode};
use crate::script::catalog_of;
use crate::types::{GateMode, NodeConfig, ScriptKind};
use clap::{Args, ValueEnum};
use tracing::info;

/// Catalog subset to probe with
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProbeSet {
    All,
    SingleSig,
    MultiSig,
    NonStandard,
}

impl ProbeSet {
    fn kind(&self) -> Option<ScriptKind> {
        match self {
            ProbeSet::All => None,
            ProbeSet::SingleSig => Some(ScriptKind::StandardSingleSig),
            ProbeSet::MultiSig => Some(ScriptKind::StandardMultiSig),
            ProbeSet::NonStandard => Some(ScriptKind::NonStandard),
        }
    }
}

/// Run the gate against two in-process nodes
#[derive(Args)]
pub struct SimulateCommand {
    /// How the simulated servers treat the deprecation flag
    #[arg(long, value_enum, default_value_t = LegacyEmission::FollowFlag)]
    server: LegacyEmission,

    /// Expect the legacy fields to be gone from both nodes
    #[arg(long)]
    retired: bool,

    /// Catalog entries to include
    #[arg(long, value_enum, default_value_t = ProbeSet::All)]
    probe: ProbeSet,

    /// Network used to encode addresses
    #[arg(long, default_value = "regtest")]
    network: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    format: OutputFormat,
}

impl SimulateCommand {
    pub async fn run(&self) -> AppResult<bool> {
        info!("=== Legacy Address Field Gate - simulated nodes ===");

        let harness_config = HarnessConfig {
            network: self.network.clone(),
            retired: self.retired,
            ..HarnessConfig::default()
        };
        let mut settings = HarnessSettings::from_config(&harness_config)?;
        if let Some(kind) = self.probe.kind() {
            settings = settings.with_entries(catalog_of(kind));
        }

        let legacy_off =
            SimulatedNode::with_emission(NodeConfig::legacy_off(), settings.network, self.server);
        let legacy_on =
            SimulatedNode::with_emission(NodeConfig::legacy_on(), settings.network, self.server);

        if settings.mode == GateMode::Retired {
            info!("Checking retired-field rules against {:?} servers", self.server);
        }

        let report = Harness::new(settings).run(&legacy_off, &legacy_on).await?;
        println!("{}", format_report(&report, self.format)?);

        Ok(report.passed())
    }
}
