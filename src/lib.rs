//! Legacy address field gate for `decoderawtransaction`
//!
//! Builds one probe transaction from a fixed script catalog, decodes it on a
//! node started without `-deprecatedrpc=addresses` and on one started with
//! it, and reports every output whose `reqSigs`/`addresses` contradict the
//! node's configuration.

pub mod cli;
pub mod config;
pub mod errors;
pub mod gate;
pub mod rpc;
pub mod script;
pub mod transaction;
pub mod types;
