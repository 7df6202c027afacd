//! Harness orchestration
//!
//! Builds the probe transaction once, decodes it on both fixtures
//! concurrently, correlates outputs back to catalog entries by position and
//! collects every violation into a [`Report`].

use crate::config::HarnessConfig;
use crate::errors::{AppError, AppResult, RpcError};
use crate::gate::checker::{ExpectedFields, FieldGateChecker};
use crate::rpc::NodeHandle;
use crate::script::{catalog, CatalogScript};
use crate::transaction::{build, outputs_for, BuiltTransaction};
use crate::types::{GateField, GateMode, GateViolation, NodeConfig, OutputDescriptor, Report};
use bitcoin::{Amount, Network};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Everything a run needs besides the fixtures themselves
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub network: Network,
    pub mode: GateMode,
    pub output_value: Amount,
    pub verify_idempotence: bool,
    pub entries: Vec<CatalogScript>,
}

impl HarnessSettings {
    /// Full catalog, deprecation rules, idempotence probe on
    pub fn new(network: Network) -> Self {
        Self {
            network,
            mode: GateMode::Deprecation,
            output_value: Amount::from_sat(10_000),
            verify_idempotence: true,
            entries: catalog(),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> AppResult<Self> {
        Ok(Self {
            network: config.network()?,
            mode: config.gate_mode(),
            output_value: Amount::from_sat(config.output_value_sat),
            verify_idempotence: config.verify_idempotence,
            entries: catalog(),
        })
    }

    /// Restrict the probe to the given entries, in the given order
    pub fn with_entries(mut self, entries: Vec<CatalogScript>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_mode(mut self, mode: GateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_idempotence(mut self, verify: bool) -> Self {
        self.verify_idempotence = verify;
        self
    }
}

/// Decode results for one fixture, kept apart from the other fixture's
struct FixtureDecode {
    config: NodeConfig,
    vout: Vec<Value>,
    repeat_vout: Option<Vec<Value>>,
    descriptors: Vec<OutputDescriptor>,
}

pub struct Harness {
    settings: HarnessSettings,
}

impl Harness {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Build the probe transaction for the configured entries
    pub fn build_probe(&self) -> AppResult<BuiltTransaction> {
        let outputs = outputs_for(&self.settings.entries, self.settings.output_value);
        Ok(build(&outputs)?)
    }

    /// Run the gate against both fixtures
    ///
    /// Gate violations land in the report. A transport or build failure
    /// aborts the run with an error instead.
    pub async fn run<Off, On>(&self, legacy_off: &Off, legacy_on: &On) -> AppResult<Report>
    where
        Off: NodeHandle,
        On: NodeHandle,
    {
        Self::ensure_slot(legacy_off, NodeConfig::legacy_off())?;
        Self::ensure_slot(legacy_on, NodeConfig::legacy_on())?;

        let expected = self
            .settings
            .entries
            .iter()
            .map(|entry| ExpectedFields::for_entry(entry, self.settings.network))
            .collect::<AppResult<Vec<_>>>()?;

        let built = self.build_probe()?;
        info!(
            "Probe transaction {} carries {} outputs",
            built.txid(),
            built.output_count()
        );

        let (off_result, on_result) = tokio::join!(
            self.decode_fixture(legacy_off, &built),
            self.decode_fixture(legacy_on, &built)
        );
        let decodes = [off_result?, on_result?];

        let checker = FieldGateChecker::new(self.settings.mode);
        let mut report = Report::new(built.txid().to_string(), built.hex.clone(), self.settings.mode);
        report.outputs_checked = self.settings.entries.len();

        for decode in &decodes {
            report.fixtures.push(decode.config);

            for (index, (entry, descriptor)) in self
                .settings
                .entries
                .iter()
                .zip(&decode.descriptors)
                .enumerate()
            {
                let violations =
                    checker.check(index, entry, &expected[index], descriptor, decode.config);
                for violation in &violations {
                    warn!("Gate violation: {}", violation);
                }
                report.violations.extend(violations);
            }

            if let Some(repeat) = &decode.repeat_vout {
                report
                    .violations
                    .extend(self.compare_repeat(decode.config, &decode.vout, repeat));
            }
        }

        info!(
            "Gate run finished: {} violation(s) across {} fixture(s)",
            report.violations.len(),
            report.fixtures.len()
        );
        Ok(report)
    }

    fn ensure_slot<N: NodeHandle>(node: &N, slot: NodeConfig) -> AppResult<()> {
        if node.config() != slot {
            return Err(AppError::Config(format!(
                "fixture '{}' was started as {} but passed as the {} fixture",
                node.name(),
                node.config(),
                slot
            )));
        }
        Ok(())
    }

    async fn decode_fixture<N: NodeHandle>(
        &self,
        node: &N,
        built: &BuiltTransaction,
    ) -> AppResult<FixtureDecode> {
        debug!("Submitting probe to {}", node.name());
        let decoded = node.decode_raw_transaction(&built.hex).await?;
        Self::ensure_same_transaction(node, &decoded, built)?;

        let descriptors = OutputDescriptor::list_from_decoded(&decoded, built.output_count())?;
        debug!(
            "{} reported legacy fields on {} of {} outputs",
            node.name(),
            descriptors.iter().filter(|d| d.has_legacy_fields()).count(),
            descriptors.len()
        );
        let vout = Self::vout_of(&decoded)?;

        let repeat_vout = if self.settings.verify_idempotence {
            let again = node.decode_raw_transaction(&built.hex).await?;
            Some(Self::vout_of(&again)?)
        } else {
            None
        };

        Ok(FixtureDecode {
            config: node.config(),
            vout,
            repeat_vout,
            descriptors,
        })
    }

    fn ensure_same_transaction<N: NodeHandle>(
        node: &N,
        decoded: &Value,
        built: &BuiltTransaction,
    ) -> AppResult<()> {
        let expected = built.txid().to_string();
        match decoded.get("txid").and_then(Value::as_str) {
            Some(txid) if txid != expected => Err(RpcError::InvalidResponse(format!(
                "{} decoded txid {} but {} was submitted",
                node.name(),
                txid,
                expected
            ))
            .into()),
            _ => Ok(()),
        }
    }

    fn vout_of(decoded: &Value) -> AppResult<Vec<Value>> {
        decoded
            .get("vout")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                RpcError::InvalidResponse("decoded transaction has no vout array".to_string())
                    .into()
            })
    }

    /// Repeat decodes must serialise byte-for-byte identically, output by output
    fn compare_repeat(
        &self,
        config: NodeConfig,
        first: &[Value],
        second: &[Value],
    ) -> Vec<GateViolation> {
        let mut violations = Vec::new();
        for (index, entry) in self.settings.entries.iter().enumerate() {
            let a = first.get(index).cloned().unwrap_or(Value::Null);
            let b = second.get(index).cloned().unwrap_or(Value::Null);
            if a.to_string() != b.to_string() {
                violations.push(GateViolation {
                    config,
                    output_index: index,
                    label: entry.label.to_string(),
                    kind: entry.kind,
                    field: GateField::Descriptor,
                    expected: a,
                    actual: b,
                });
            }
        }
        violations
    }
}
