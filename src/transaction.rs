//! Probe transaction construction
//!
//! The probe is never broadcast, only decoded, so its single input spends a
//! fixed placeholder outpoint and carries no signature.

use crate::errors::BuildError;
use crate::script::CatalogScript;
use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::hashes::Hash;
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use tracing::debug;

/// Consensus limit on script size
pub const MAX_SCRIPT_SIZE: usize = 10_000;

const PLACEHOLDER_PREVOUT: [u8; 32] = [0x11; 32];

/// A catalog script paired with the value it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub value: Amount,
    pub script: CatalogScript,
}

/// A serialised probe transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    pub transaction: Transaction,
    pub hex: String,
}

impl BuiltTransaction {
    pub fn txid(&self) -> Txid {
        self.transaction.compute_txid()
    }

    pub fn output_count(&self) -> usize {
        self.transaction.output.len()
    }
}

/// Pair every catalog entry with the same output value
pub fn outputs_for(entries: &[CatalogScript], value: Amount) -> Vec<TransactionOutput> {
    entries
        .iter()
        .map(|script| TransactionOutput {
            value,
            script: script.clone(),
        })
        .collect()
}

/// Build and serialise a transaction whose outputs are `outputs`, in order
pub fn build(outputs: &[TransactionOutput]) -> Result<BuiltTransaction, BuildError> {
    if outputs.is_empty() {
        return Err(BuildError::NoOutputs);
    }

    let mut tx_outputs = Vec::with_capacity(outputs.len());
    for (index, output) in outputs.iter().enumerate() {
        let len = output.script.script.len();
        if len > MAX_SCRIPT_SIZE {
            return Err(BuildError::ScriptTooLarge {
                index,
                len,
                limit: MAX_SCRIPT_SIZE,
            });
        }
        if output.value > Amount::MAX_MONEY {
            return Err(BuildError::ValueOutOfRange {
                index,
                value_sat: output.value.to_sat(),
            });
        }
        tx_outputs.push(TxOut {
            value: output.value,
            script_pubkey: output.script.script.clone(),
        });
    }

    let transaction = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array(PLACEHOLDER_PREVOUT),
                vout: 0,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: tx_outputs,
    };

    let hex = serialize_hex(&transaction);
    debug!(
        "Built probe transaction {} with {} outputs ({} bytes)",
        transaction.compute_txid(),
        transaction.output.len(),
        hex.len() / 2
    );

    Ok(BuiltTransaction { transaction, hex })
}
