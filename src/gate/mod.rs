//! Legacy field gate
//!
//! - **Checker** - per-output field rules for a given fixture configuration
//! - **Harness** - builds the probe, drives both fixtures, aggregates the report

pub mod checker;
pub mod harness;

pub use checker::{ExpectedFields, FieldGateChecker};
pub use harness::{Harness, HarnessSettings};
