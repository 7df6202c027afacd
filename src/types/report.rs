//! Gate violations and the run report

use super::{GateMode, NodeConfig, ScriptKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which part of a descriptor broke a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateField {
    /// Legacy `reqSigs`
    RequiredSignatures,
    /// Legacy `addresses`
    Addresses,
    /// Template label in `type`
    ScriptType,
    /// The descriptor as a whole (script hex, repeat-decode stability)
    Descriptor,
}

impl GateField {
    /// Name of the field as it appears on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            GateField::RequiredSignatures => "reqSigs",
            GateField::Addresses => "addresses",
            GateField::ScriptType => "type",
            GateField::Descriptor => "scriptPubKey",
        }
    }
}

/// A decoded descriptor contradicting the field rules for its configuration
///
/// `expected`/`actual` use JSON `null` for an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateViolation {
    pub config: NodeConfig,
    pub output_index: usize,
    pub label: String,
    pub kind: ScriptKind,
    pub field: GateField,
    pub expected: Value,
    pub actual: Value,
}

fn show(value: &Value) -> String {
    match value {
        Value::Null => "absent".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for GateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] output {} ({}, {}): {} expected {}, got {}",
            self.config,
            self.output_index,
            self.label,
            self.kind,
            self.field.wire_name(),
            show(&self.expected),
            show(&self.actual)
        )
    }
}

/// Outcome of one harness run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: String,
    pub txid: String,
    pub transaction_hex: String,
    pub mode: GateMode,
    /// Outputs checked per fixture
    pub outputs_checked: usize,
    pub fixtures: Vec<NodeConfig>,
    pub violations: Vec<GateViolation>,
}

impl Report {
    pub fn new(txid: String, transaction_hex: String, mode: GateMode) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            txid,
            transaction_hex,
            mode,
            outputs_checked: 0,
            fixtures: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// A report passes iff it carries no violations
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations recorded against one fixture
    pub fn violations_for(&self, config: NodeConfig) -> impl Iterator<Item = &GateViolation> {
        self.violations.iter().filter(move |v| v.config == config)
    }

    /// Human-readable multi-line summary
    pub fn to_console(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Legacy Address Field Gate ===\n");
        out.push_str(&format!("Transaction: {}\n", self.txid));
        out.push_str(&format!("Mode:        {:?}\n", self.mode));
        out.push_str(&format!(
            "Fixtures:    {}\n",
            self.fixtures
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        out.push_str(&format!("Outputs:     {} per fixture\n", self.outputs_checked));

        if self.passed() {
            out.push_str("Result:      PASS\n");
        } else {
            out.push_str(&format!(
                "Result:      FAIL ({} violation{})\n",
                self.violations.len(),
                if self.violations.len() == 1 { "" } else { "s" }
            ));
            for violation in &self.violations {
                out.push_str(&format!("  - {}\n", violation));
            }
        }
        out
    }
}
