// Library interface for the coinledger wallet ledger
// Tracks UTXO assets and token balances for one account and reconciles them
// against observed transactions, block confirmations and a remote node.

pub mod config;
pub mod error;
pub mod coin;
pub mod registry;
pub mod transaction;
pub mod asset;
pub mod balance;
pub mod verify;
pub mod metrics;

pub use coin::{Coin, TxId};
pub use asset::{AssetBalance, AssetBalanceSnapshot};
pub use balance::{Balance, BalanceSnapshot, NO_NET};
pub use error::{LedgerError, LedgerResult};
pub use transaction::{LedgerTx, Transaction, TxInput, TxOutput};
pub use verify::{RemoteOutput, Verifier};
pub use rust_decimal::Decimal;
