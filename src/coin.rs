use serde::{Serialize, Deserialize, Serializer, Deserializer};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use crate::error::LedgerError;

/// A 32-byte transaction hash. Text form is lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

impl FromStr for TxId {
    type Err = LedgerError;

    /// Accepts 64 hex digits, with or without a leading `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(trimmed).map_err(|_| LedgerError::InvalidTxId(s.to_string()))?;
        if raw.len() != 32 {
            return Err(LedgerError::InvalidTxId(s.to_string()));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&raw);
        Ok(TxId(out))
    }
}

impl From<[u8; 32]> for TxId {
    fn from(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// One transaction output tracked by the wallet.
///
/// Identity is `(txid, index)`; two coins with the same identity but different
/// values still refer to the same output. The serialized form is the
/// `{ index, txid, value }` record used in snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coin {
    pub index: u32,
    pub txid: TxId,
    pub value: Decimal,
}

impl Coin {
    pub fn new(txid: TxId, index: u32, value: Decimal) -> Self {
        Coin { index, txid, value }
    }

    /// True if `self` refers to the output `index` of `txid`.
    pub fn matches_outpoint(&self, txid: &TxId, index: u32) -> bool {
        self.index == index && &self.txid == txid
    }

    pub fn same_output(&self, other: &Coin) -> bool {
        self.matches_outpoint(&other.txid, other.index)
    }
}
