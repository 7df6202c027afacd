//! In-process node fixture
//!
//! Answers `decoderawtransaction` the way a node does, without a process or
//! a network. Each instance is built with its own [`NodeConfig`] and never
//! changes it afterwards.

use crate::errors::{RpcError, RpcResult};
use crate::rpc::NodeHandle;
use crate::script::{classify, extract_destinations, ScriptTemplate};
use crate::types::NodeConfig;
use bitcoin::consensus::encode::deserialize;
use bitcoin::{Network, Script, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

/// How a simulated server decides whether to emit `reqSigs`/`addresses`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LegacyEmission {
    /// Emit only when started with the deprecation flag
    #[default]
    FollowFlag,
    /// Pre-deprecation server: always emit
    Always,
    /// Fields removed from the server: never emit
    Never,
}

/// Reference fixture decoding transactions in-process
#[derive(Debug, Clone)]
pub struct SimulatedNode {
    name: String,
    config: NodeConfig,
    network: Network,
    emission: LegacyEmission,
}

impl SimulatedNode {
    pub fn new(config: NodeConfig, network: Network) -> Self {
        Self::with_emission(config, network, LegacyEmission::FollowFlag)
    }

    pub fn with_emission(config: NodeConfig, network: Network, emission: LegacyEmission) -> Self {
        Self {
            name: format!("simulated {}", config.label()),
            config,
            network,
            emission,
        }
    }

    fn emits_legacy_fields(&self) -> bool {
        match self.emission {
            LegacyEmission::FollowFlag => self.config.deprecated_addresses_enabled,
            LegacyEmission::Always => true,
            LegacyEmission::Never => false,
        }
    }

    /// Decode `hex` into the verbose transaction object
    pub fn decode(&self, hex: &str) -> RpcResult<Value> {
        let tx_bytes = hex::decode(hex).map_err(|e| decode_failed(format!("invalid hex: {}", e)))?;
        let tx: Transaction =
            deserialize(&tx_bytes).map_err(|e| decode_failed(e.to_string()))?;

        let vin: Vec<Value> = tx
            .input
            .iter()
            .map(|input| {
                json!({
                    "txid": input.previous_output.txid.to_string(),
                    "vout": input.previous_output.vout,
                    "scriptSig": {
                        "asm": input.script_sig.to_asm_string(),
                        "hex": hex::encode(input.script_sig.as_bytes()),
                    },
                    "sequence": input.sequence.0,
                })
            })
            .collect();

        let vout: Vec<Value> = tx
            .output
            .iter()
            .enumerate()
            .map(|(n, output)| {
                json!({
                    "value": output.value.to_btc(),
                    "n": n,
                    "scriptPubKey": self.script_pubkey_json(&output.script_pubkey),
                })
            })
            .collect();

        debug!(
            "{} decoded {} with {} outputs",
            self.name,
            tx.compute_txid(),
            vout.len()
        );

        Ok(json!({
            "txid": tx.compute_txid().to_string(),
            "hash": tx.compute_wtxid().to_string(),
            "version": tx.version.0,
            "size": tx.total_size(),
            "vsize": tx.vsize(),
            "weight": tx.weight().to_wu(),
            "locktime": tx.lock_time.to_consensus_u32(),
            "vin": vin,
            "vout": vout,
        }))
    }

    fn script_pubkey_json(&self, script: &Script) -> Value {
        let template = classify(script);
        let mut object = Map::new();
        object.insert("asm".to_string(), json!(script.to_asm_string()));
        object.insert("hex".to_string(), json!(hex::encode(script.as_bytes())));
        object.insert("type".to_string(), json!(template.type_label()));

        let Some(destinations) = extract_destinations(script, self.network) else {
            return Value::Object(object);
        };

        // Bare pubkey and multisig outputs carry no single address
        if !matches!(
            template,
            ScriptTemplate::PubKey { .. } | ScriptTemplate::Multisig { .. }
        ) {
            if let Some(address) = destinations.addresses.first() {
                object.insert("address".to_string(), json!(address));
            }
        }

        if self.emits_legacy_fields() {
            object.insert("reqSigs".to_string(), json!(destinations.required));
            object.insert("addresses".to_string(), json!(destinations.addresses));
        }

        Value::Object(object)
    }
}

fn decode_failed(message: String) -> RpcError {
    RpcError::CallFailed {
        method: "decoderawtransaction".to_string(),
        message: format!("TX decode failed: {}", message),
    }
}

impl NodeHandle for SimulatedNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> NodeConfig {
        self.config
    }

    async fn decode_raw_transaction(&self, hex: &str) -> RpcResult<Value> {
        self.decode(hex)
    }
}
