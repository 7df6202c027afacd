//! Legacy address field gate - Type System
//!
//! - `script_kind`: address-derivability classification of catalog scripts
//! - `node_config`: per-fixture configuration and gate modes
//! - `descriptor`: decoded `vout` entries as reported by a node
//! - `report`: gate violations and the run report

mod descriptor;
mod node_config;
mod report;
mod script_kind;

pub use descriptor::OutputDescriptor;
pub use node_config::{GateMode, NodeConfig, DEPRECATED_ADDRESSES_ARG};
pub use report::{GateField, GateViolation, Report};
pub use script_kind::ScriptKind;
