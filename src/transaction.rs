use serde::{Serialize, Deserialize};
use rust_decimal::Decimal;
use crate::coin::TxId;

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TxInput {
    pub prev_hash: TxId,
    pub prev_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxOutput {
    pub asset_id: String,
    pub value: Decimal,
    pub script_hash: String, // recipient
}

/// What the ledger needs to see of a transaction. Construction, signing and
/// wire encoding live elsewhere.
pub trait LedgerTx {
    fn hash(&self) -> TxId;
    fn inputs(&self) -> &[TxInput];
    fn outputs(&self) -> &[TxOutput];
}

/// Minimal owned transaction, hashed with BLAKE3 over its canonical content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(default)]
    pub nonce: u64,
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Transaction { inputs, outputs, nonce: 0 }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// The bytes the hash commits to.
    pub fn content_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&self.nonce.to_le_bytes());
        data.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            data.extend_from_slice(input.prev_hash.as_bytes());
            data.extend_from_slice(&input.prev_index.to_le_bytes());
        }
        data.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            data.extend_from_slice(output.asset_id.as_bytes());
            data.push(0);
            data.extend_from_slice(&output.value.normalize().serialize());
            data.extend_from_slice(output.script_hash.as_bytes());
            data.push(0);
        }
        data
    }
}

impl LedgerTx for Transaction {
    fn hash(&self) -> TxId {
        TxId(*blake3::hash(&self.content_bytes()).as_bytes())
    }

    fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }
}
