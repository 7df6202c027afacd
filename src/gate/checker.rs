//! Field gate rules
//!
//! With the legacy fields gated off, `reqSigs` and `addresses` must be absent
//! whatever the script. With them gated on, derivable scripts must carry the
//! exact threshold and addresses (in key order), and non-derivable scripts may
//! omit both but must never report a non-empty derivation.

use crate::errors::{AppError, AppResult};
use crate::script::{extract_destinations, CatalogScript, Destinations};
use crate::types::{GateField, GateMode, GateViolation, NodeConfig, OutputDescriptor, ScriptKind};
use bitcoin::Network;
use serde_json::{json, Value};

/// Values a correct node reports for one catalog entry when the fields are on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedFields {
    pub script_hex: String,
    /// `None` for scripts with no derivable destination
    pub derivation: Option<Destinations>,
}

impl ExpectedFields {
    /// Derive the expectation for `entry`
    ///
    /// A standard entry that does not derive is a broken catalog, not a gate failure.
    pub fn for_entry(entry: &CatalogScript, network: Network) -> AppResult<Self> {
        let derivation = extract_destinations(&entry.script, network);

        match (entry.kind, &derivation) {
            (ScriptKind::NonStandard, Some(_)) => {
                return Err(AppError::Script(format!(
                    "catalog entry '{}' is marked non-standard but derives addresses",
                    entry.label
                )))
            }
            (ScriptKind::StandardSingleSig | ScriptKind::StandardMultiSig, None) => {
                return Err(AppError::Script(format!(
                    "catalog entry '{}' is marked standard but derives no address",
                    entry.label
                )))
            }
            (ScriptKind::StandardSingleSig, Some(destinations))
                if destinations.required != 1 || destinations.addresses.len() != 1 =>
            {
                return Err(AppError::Script(format!(
                    "catalog entry '{}' is single-sig but derives {} of {}",
                    entry.label,
                    destinations.required,
                    destinations.addresses.len()
                )))
            }
            _ => {}
        }

        Ok(Self {
            script_hex: hex::encode(entry.script.as_bytes()),
            derivation,
        })
    }
}

/// Applies the gate rules to decoded descriptors
#[derive(Debug, Clone, Copy)]
pub struct FieldGateChecker {
    mode: GateMode,
}

impl FieldGateChecker {
    pub fn new(mode: GateMode) -> Self {
        Self { mode }
    }

    /// Check one descriptor against the rules for `config`
    ///
    /// Returns every violated rule; an empty vector means the descriptor conforms.
    pub fn check(
        &self,
        index: usize,
        entry: &CatalogScript,
        expected: &ExpectedFields,
        descriptor: &OutputDescriptor,
        config: NodeConfig,
    ) -> Vec<GateViolation> {
        let mut violations = Vec::new();
        let mut record = |field: GateField, expected: Value, actual: Value| {
            violations.push(GateViolation {
                config,
                output_index: index,
                label: entry.label.to_string(),
                kind: entry.kind,
                field,
                expected,
                actual,
            });
        };

        if descriptor.script_hex != expected.script_hex {
            record(
                GateField::Descriptor,
                json!(expected.script_hex),
                json!(descriptor.script_hex),
            );
        }

        if descriptor.script_type != entry.expected_type {
            record(
                GateField::ScriptType,
                json!(entry.expected_type),
                json!(descriptor.script_type),
            );
        }

        let actual_req_sigs = json!(descriptor.required_signatures);
        let actual_addresses = json!(descriptor.addresses);

        if !self.mode.emits_legacy_fields(config) {
            if descriptor.required_signatures.is_some() {
                record(GateField::RequiredSignatures, Value::Null, actual_req_sigs);
            }
            if descriptor.addresses.is_some() {
                record(GateField::Addresses, Value::Null, actual_addresses);
            }
            return violations;
        }

        match &expected.derivation {
            Some(destinations) => {
                if descriptor.required_signatures != Some(i64::from(destinations.required)) {
                    record(
                        GateField::RequiredSignatures,
                        json!(destinations.required),
                        actual_req_sigs,
                    );
                }
                if descriptor.addresses.as_ref() != Some(&destinations.addresses) {
                    record(
                        GateField::Addresses,
                        json!(destinations.addresses),
                        actual_addresses,
                    );
                }
            }
            None => {
                // Optional, but never a fabricated derivation
                if matches!(descriptor.required_signatures, Some(n) if n != 0) {
                    record(GateField::RequiredSignatures, json!(0), actual_req_sigs);
                }
                if matches!(&descriptor.addresses, Some(list) if !list.is_empty()) {
                    record(GateField::Addresses, json!([]), actual_addresses);
                }
            }
        }

        violations
    }
}
