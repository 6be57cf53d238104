use serde::{Serialize, Deserialize};
use rust_decimal::Decimal;
use tracing::debug;
use crate::coin::{Coin, TxId};

/// Plain record form of an [`AssetBalance`]. Every field is optional on input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetBalanceSnapshot {
    pub balance: Decimal,
    pub unspent: Vec<Coin>,
    pub spent: Vec<Coin>,
    pub unconfirmed: Vec<Coin>,
}

/// Coin ledger for a single asset.
///
/// Coins live in exactly one of `unspent`, `spent` or `unconfirmed`, and
/// `balance` always equals the sum of `unspent`. Fields are private so every
/// mutation goes through a method that keeps the cached balance current.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetBalance {
    balance: Decimal,
    unspent: Vec<Coin>,
    spent: Vec<Coin>,
    unconfirmed: Vec<Coin>,
}

impl AssetBalance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the three coin lists; the balance is derived, never trusted.
    pub fn from_parts(unspent: Vec<Coin>, spent: Vec<Coin>, unconfirmed: Vec<Coin>) -> Self {
        let mut ab = AssetBalance { balance: Decimal::ZERO, unspent, spent, unconfirmed };
        ab.recompute();
        ab
    }

    /// The snapshot's `balance` field is ignored and recomputed from `unspent`.
    pub fn from_snapshot(snapshot: AssetBalanceSnapshot) -> Self {
        Self::from_parts(snapshot.unspent, snapshot.spent, snapshot.unconfirmed)
    }

    pub fn export(&self) -> AssetBalanceSnapshot {
        AssetBalanceSnapshot {
            balance: self.balance,
            unspent: self.unspent.clone(),
            spent: self.spent.clone(),
            unconfirmed: self.unconfirmed.clone(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn unspent(&self) -> &[Coin] {
        &self.unspent
    }

    pub fn spent(&self) -> &[Coin] {
        &self.spent
    }

    pub fn unconfirmed(&self) -> &[Coin] {
        &self.unconfirmed
    }

    /// Sum of coins still waiting for a block. Not part of `balance`.
    pub fn unconfirmed_total(&self) -> Decimal {
        self.unconfirmed.iter().map(|c| c.value).sum()
    }

    pub fn holds_unspent(&self, txid: &TxId, index: u32) -> bool {
        self.unspent.iter().any(|c| c.matches_outpoint(txid, index))
    }

    /// Move the unspent coin `(txid, index)` to `spent`. Returns false if this
    /// asset does not hold it.
    pub fn spend(&mut self, txid: &TxId, index: u32) -> bool {
        match self.unspent.iter().position(|c| c.matches_outpoint(txid, index)) {
            Some(pos) => {
                let coin = self.unspent.remove(pos);
                debug!("🔻 spent {}:{} ({})", coin.txid, coin.index, coin.value);
                self.spent.push(coin);
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// A confirmed output: drop any pending copy of it, then add it to `unspent`.
    pub fn receive_confirmed(&mut self, coin: Coin) {
        self.unconfirmed.retain(|c| !c.same_output(&coin));
        self.unspent.push(coin);
        self.recompute();
    }

    pub fn receive_unconfirmed(&mut self, coin: Coin) {
        self.unconfirmed.push(coin);
    }

    /// Promote every pending coin to `unspent`, preserving order. Returns how
    /// many coins moved.
    pub fn confirm_all(&mut self) -> usize {
        let moved = self.unconfirmed.len();
        if moved > 0 {
            self.unspent.append(&mut self.unconfirmed);
            self.recompute();
        }
        moved
    }

    fn recompute(&mut self) {
        self.balance = self.unspent.iter().map(|c| c.value).sum();
    }
}
