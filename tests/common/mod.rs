//! Common Test Utilities
//!
//! Shared fixtures for the unit and integration test binaries. Not every
//! binary uses every helper.
#![allow(dead_code)]

pub mod mock_node;
