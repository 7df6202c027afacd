//! Script template matching and address derivation
//!
//! Mirrors the node's own template solver so that the harness can compute,
//! independently of any fixture, what `type`, `reqSigs` and `addresses` a
//! correct node reports for a script.

use bitcoin::hashes::Hash;
use bitcoin::{Address, Network, PubkeyHash, Script};
use serde::Serialize;

/// Maximum number of keys in a bare multisig script
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 16;

const OP_0: u8 = 0x00;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKMULTISIG: u8 = 0xae;

/// Script template as recognised by the node's solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptTemplate {
    PubKey { key: Vec<u8> },
    PubKeyHash,
    ScriptHash,
    Multisig { required: u8, keys: Vec<Vec<u8>> },
    WitnessV0KeyHash,
    WitnessV0ScriptHash,
    WitnessV1Taproot,
    WitnessUnknown,
    NullData,
    NonStandard,
}

impl ScriptTemplate {
    /// Label reported in `scriptPubKey.type`
    pub fn type_label(&self) -> &'static str {
        match self {
            ScriptTemplate::PubKey { .. } => "pubkey",
            ScriptTemplate::PubKeyHash => "pubkeyhash",
            ScriptTemplate::ScriptHash => "scripthash",
            ScriptTemplate::Multisig { .. } => "multisig",
            ScriptTemplate::WitnessV0KeyHash => "witness_v0_keyhash",
            ScriptTemplate::WitnessV0ScriptHash => "witness_v0_scripthash",
            ScriptTemplate::WitnessV1Taproot => "witness_v1_taproot",
            ScriptTemplate::WitnessUnknown => "witness_unknown",
            ScriptTemplate::NullData => "nulldata",
            ScriptTemplate::NonStandard => "nonstandard",
        }
    }
}

/// Addresses a script pays to, with the number of signatures needed to spend it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destinations {
    pub required: u32,
    pub addresses: Vec<String>,
}

/// Whether `key` has the length implied by its prefix byte
///
/// Only the encoding is checked, not whether the point is on the curve.
pub fn valid_pubkey_size(key: &[u8]) -> bool {
    match key.first() {
        Some(0x02) | Some(0x03) => key.len() == 33,
        Some(0x04) | Some(0x06) | Some(0x07) => key.len() == 65,
        _ => false,
    }
}

fn small_int(opcode: u8) -> Option<u8> {
    if (OP_1..=OP_16).contains(&opcode) {
        Some(opcode - 0x50)
    } else {
        None
    }
}

/// Parse a bare `OP_M <key>... OP_N OP_CHECKMULTISIG` script
///
/// Returns `(M, keys)` only when every push is a validly sized public key,
/// `1 <= M <= N <= 16`, and `N` matches the key count.
pub fn parse_multisig(script_bytes: &[u8]) -> Option<(u8, Vec<Vec<u8>>)> {
    if script_bytes.len() < 3 || script_bytes[script_bytes.len() - 1] != OP_CHECKMULTISIG {
        return None;
    }

    let required = small_int(script_bytes[0])?;
    let mut keys = Vec::new();
    let mut pos = 1;

    // Key pushes are direct pushes of 33 or 65 bytes
    while pos < script_bytes.len() - 2 {
        let push_len = match script_bytes[pos] {
            0x21 => 33,
            0x41 => 65,
            _ => break,
        };
        let key = script_bytes.get(pos + 1..pos + 1 + push_len)?;
        if !valid_pubkey_size(key) {
            return None;
        }
        keys.push(key.to_vec());
        pos += 1 + push_len;
    }

    // Exactly OP_N OP_CHECKMULTISIG must remain
    if pos + 2 != script_bytes.len() {
        return None;
    }
    let total = small_int(script_bytes[pos])?;

    if total as usize != keys.len() || required > total || keys.len() > MAX_PUBKEYS_PER_MULTISIG {
        return None;
    }

    Some((required, keys))
}

fn parse_pay_to_pubkey(script_bytes: &[u8]) -> Option<Vec<u8>> {
    let (&last, body) = script_bytes.split_last()?;
    let (&push, key) = body.split_first()?;
    if last != OP_CHECKSIG || push as usize != key.len() || !valid_pubkey_size(key) {
        return None;
    }
    Some(key.to_vec())
}

/// Match a script against the known templates, in solver order
pub fn classify(script: &Script) -> ScriptTemplate {
    let bytes = script.as_bytes();

    if script.is_p2sh() {
        return ScriptTemplate::ScriptHash;
    }

    if script.is_witness_program() {
        return if script.is_p2wpkh() {
            ScriptTemplate::WitnessV0KeyHash
        } else if script.is_p2wsh() {
            ScriptTemplate::WitnessV0ScriptHash
        } else if bytes[0] == OP_0 {
            // v0 programs of any other length are not valid outputs
            ScriptTemplate::NonStandard
        } else if script.is_p2tr() {
            ScriptTemplate::WitnessV1Taproot
        } else {
            ScriptTemplate::WitnessUnknown
        };
    }

    if script.is_op_return() {
        return if Script::from_bytes(&bytes[1..]).is_push_only() {
            ScriptTemplate::NullData
        } else {
            ScriptTemplate::NonStandard
        };
    }

    if let Some(key) = parse_pay_to_pubkey(bytes) {
        return ScriptTemplate::PubKey { key };
    }

    if script.is_p2pkh() {
        return ScriptTemplate::PubKeyHash;
    }

    if let Some((required, keys)) = parse_multisig(bytes) {
        return ScriptTemplate::Multisig { required, keys };
    }

    ScriptTemplate::NonStandard
}

/// Legacy P2PKH address for raw key bytes
///
/// Hashes the encoded key directly, so keys that are not valid curve points
/// still map to an address, as the node does.
pub fn key_address(key: &[u8], network: Network) -> String {
    Address::p2pkh(PubkeyHash::hash(key), network).to_string()
}

/// Derive every destination of `script`
///
/// Returns `None` when the script pays to no address (`nulldata`,
/// `nonstandard`), which is exactly when a node omits the legacy fields.
pub fn extract_destinations(script: &Script, network: Network) -> Option<Destinations> {
    match classify(script) {
        ScriptTemplate::NullData | ScriptTemplate::NonStandard => None,
        ScriptTemplate::PubKey { key } => Some(Destinations {
            required: 1,
            addresses: vec![key_address(&key, network)],
        }),
        ScriptTemplate::Multisig { required, keys } => Some(Destinations {
            required: required as u32,
            addresses: keys.iter().map(|key| key_address(key, network)).collect(),
        }),
        _ => Address::from_script(script, network)
            .ok()
            .map(|address| Destinations {
                required: 1,
                addresses: vec![address.to_string()],
            }),
    }
}
