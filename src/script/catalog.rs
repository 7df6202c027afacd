//! Fixed set of scripts straddling the address-derivation boundary
//!
//! Key material is embedded as byte arrays so construction is total.

use crate::types::ScriptKind;
use bitcoin::hashes::Hash;
use bitcoin::{PubkeyHash, ScriptBuf};
use serde::Serialize;

/// Compressed public key for secret key 1 (the generator point)
pub const KEY_1: [u8; 33] = [
    0x02, 0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0,
    0x62, 0x95, 0xce, 0x87, 0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d,
    0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

/// Compressed public key for secret key 2
pub const KEY_2: [u8; 33] = [
    0x02, 0xc6, 0x04, 0x7f, 0x94, 0x41, 0xed, 0x7d, 0x6d, 0x30, 0x45,
    0x40, 0x6e, 0x95, 0xc0, 0x7c, 0xd8, 0x5c, 0x77, 0x8e, 0x4b, 0x8c,
    0xef, 0x3c, 0xa7, 0xab, 0xac, 0x09, 0xb9, 0x5c, 0x70, 0x9e, 0xe5,
];

/// Compressed public key for secret key 3
pub const KEY_3: [u8; 33] = [
    0x02, 0xf9, 0x30, 0x8a, 0x01, 0x92, 0x58, 0xc3, 0x10, 0x49, 0x34,
    0x4f, 0x85, 0xf8, 0x9d, 0x52, 0x29, 0xb5, 0x31, 0xc8, 0x45, 0x83,
    0x6f, 0x99, 0xb0, 0x86, 0x01, 0xf1, 0x13, 0xbc, 0xe0, 0x36, 0xf9,
];

/// Threshold of the catalog's multisig entry
pub const MULTISIG_THRESHOLD: u8 = 2;

const OP_TRUE: u8 = 0x51;
const OP_RETURN: u8 = 0x6a;
const OP_CHECKMULTISIG: u8 = 0xae;
const PUSH_33: u8 = 0x21;

const NULLDATA_PAYLOAD: &[u8] = b"addresses";

/// One catalog entry: a script and what is known about it up front
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogScript {
    pub kind: ScriptKind,
    /// Short human label used in reports
    pub label: &'static str,
    /// `scriptPubKey.type` a correct node reports for this script
    pub expected_type: &'static str,
    pub script: ScriptBuf,
}

fn bare_multisig(required: u8, keys: &[[u8; 33]]) -> ScriptBuf {
    let mut bytes = Vec::with_capacity(3 + keys.len() * 34);
    bytes.push(0x50 + required);
    for key in keys {
        bytes.push(PUSH_33);
        bytes.extend_from_slice(key);
    }
    bytes.push(0x50 + keys.len() as u8);
    bytes.push(OP_CHECKMULTISIG);
    ScriptBuf::from_bytes(bytes)
}

/// Pay-to-pubkey-hash to [`KEY_1`]
pub fn single_sig_script() -> CatalogScript {
    CatalogScript {
        kind: ScriptKind::StandardSingleSig,
        label: "p2pkh",
        expected_type: "pubkeyhash",
        script: ScriptBuf::new_p2pkh(&PubkeyHash::hash(&KEY_1)),
    }
}

/// Bare 2-of-3 multisig over keys 1, 2, 3
pub fn multisig_script() -> CatalogScript {
    CatalogScript {
        kind: ScriptKind::StandardMultiSig,
        label: "multisig 2-of-3",
        expected_type: "multisig",
        script: bare_multisig(MULTISIG_THRESHOLD, &[KEY_1, KEY_2, KEY_3]),
    }
}

/// Scripts from which no address can be derived
pub fn nonstandard_scripts() -> Vec<CatalogScript> {
    // Multisig-shaped, but the pushes are zero-filled placeholders rather than keys
    let null_key_multisig = bare_multisig(1, &[[0u8; 33], [0u8; 33]]);

    let mut nulldata = vec![OP_RETURN, NULLDATA_PAYLOAD.len() as u8];
    nulldata.extend_from_slice(NULLDATA_PAYLOAD);

    vec![
        CatalogScript {
            kind: ScriptKind::NonStandard,
            label: "op_true",
            expected_type: "nonstandard",
            script: ScriptBuf::from_bytes(vec![OP_TRUE]),
        },
        CatalogScript {
            kind: ScriptKind::NonStandard,
            label: "null-key multisig 1-of-2",
            expected_type: "nonstandard",
            script: null_key_multisig,
        },
        CatalogScript {
            kind: ScriptKind::NonStandard,
            label: "op_return",
            expected_type: "nulldata",
            script: ScriptBuf::from_bytes(nulldata),
        },
    ]
}

/// The full catalog in its fixed order
pub fn catalog() -> Vec<CatalogScript> {
    let mut entries = vec![single_sig_script(), multisig_script()];
    entries.extend(nonstandard_scripts());
    entries
}

/// Catalog entries of a single kind, in catalog order
pub fn catalog_of(kind: ScriptKind) -> Vec<CatalogScript> {
    catalog().into_iter().filter(|entry| entry.kind == kind).collect()
}
