//! Decoded transaction output descriptors
//!
//! Parses the `vout` array of a `decoderawtransaction` response. Anything
//! that prevents a clean positional mapping back to the submitted outputs
//! is a transport failure, never a gate violation.

use crate::errors::{RpcError, RpcResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One decoded output as reported by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDescriptor {
    /// Output index reported by the node
    pub n: u32,
    /// Script template label (`pubkeyhash`, `multisig`, `nonstandard`, ...)
    pub script_type: String,
    /// Hex of the script as the node saw it
    pub script_hex: String,
    /// Legacy `reqSigs` field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_signatures: Option<i64>,
    /// Legacy `addresses` field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
}

/// Wire shape of `vout[i].scriptPubKey`
#[derive(Debug, Deserialize)]
struct ScriptPubKeyJson {
    #[serde(rename = "type")]
    script_type: String,
    hex: String,
    #[serde(rename = "reqSigs", default, deserialize_with = "present")]
    req_sigs: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    addresses: Option<Vec<String>>,
}

/// Absent keys become `None` via `default`; an explicit `null` fails to parse.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl OutputDescriptor {
    /// Whether either legacy field is present
    pub fn has_legacy_fields(&self) -> bool {
        self.required_signatures.is_some() || self.addresses.is_some()
    }

    /// Extract descriptors from a decoded transaction, in output order
    ///
    /// `expected_outputs` is the output count of the submitted transaction.
    pub fn list_from_decoded(decoded: &Value, expected_outputs: usize) -> RpcResult<Vec<Self>> {
        let vout = decoded
            .get("vout")
            .and_then(Value::as_array)
            .ok_or_else(|| RpcError::InvalidResponse("decoded transaction has no vout array".to_string()))?;

        if vout.len() != expected_outputs {
            return Err(RpcError::OutputCountMismatch {
                expected: expected_outputs,
                actual: vout.len(),
            });
        }

        vout.iter()
            .enumerate()
            .map(|(position, output)| Self::from_output(position, output))
            .collect()
    }

    fn from_output(position: usize, output: &Value) -> RpcResult<Self> {
        let n = output.get("n").and_then(Value::as_u64).ok_or_else(|| {
            RpcError::InvalidResponse(format!("vout[{}] has no numeric n", position))
        })?;

        if n != position as u64 {
            return Err(RpcError::OutputOrderMismatch {
                position,
                reported: n,
            });
        }

        let script_pubkey = output.get("scriptPubKey").cloned().ok_or_else(|| {
            RpcError::InvalidResponse(format!("vout[{}] has no scriptPubKey", position))
        })?;

        let parsed: ScriptPubKeyJson = serde_json::from_value(script_pubkey).map_err(|e| {
            RpcError::DeserialisationFailed(format!("vout[{}].scriptPubKey: {}", position, e))
        })?;

        Ok(Self {
            n: n as u32,
            script_type: parsed.script_type,
            script_hex: parsed.hex,
            required_signatures: parsed.req_sigs,
            addresses: parsed.addresses,
        })
    }
}
