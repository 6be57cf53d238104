use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Serialize, Deserialize};
use tokio::sync::Semaphore;
use tracing::debug;
use crate::{asset::AssetBalance, coin::{Coin, TxId}};

/// An output as reported by a remote node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOutput {
    pub index: u32,
    pub value: Decimal,
}

/// Ground-truth lookup against a node. `Ok(None)` means the output does not
/// exist (spent or never created); `Err` means the question could not be
/// answered. Timeouts and retries are the implementor's business.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn fetch_output(&self, node: &str, txid: &TxId, index: u32) -> Result<Option<RemoteOutput>>;
}

#[async_trait]
impl<T: Verifier + ?Sized> Verifier for std::sync::Arc<T> {
    async fn fetch_output(&self, node: &str, txid: &TxId, index: u32) -> Result<Option<RemoteOutput>> {
        (**self).fetch_output(node, txid, index).await
    }
}

/// A coin is valid iff the node reports an output at its position whose
/// index and value both match.
pub async fn verify_coin<V: Verifier + ?Sized>(
    verifier: &V,
    node: &str,
    coin: &Coin,
    limit: Option<&Semaphore>,
) -> Result<bool> {
    let _permit = match limit {
        Some(sem) => Some(sem.acquire().await.map_err(|e| anyhow!("verification limiter closed: {}", e))?),
        None => None,
    };
    let remote = verifier.fetch_output(node, &coin.txid, coin.index).await?;
    let valid = matches!(remote, Some(out) if out.index == coin.index && out.value == coin.value);
    debug!("🔎 {}:{} valid={}", coin.txid, coin.index, valid);
    Ok(valid)
}

/// Check every unspent coin of `asset` and build its replacement: valid coins
/// stay unspent, invalid ones become spent, nothing is pending. Every lookup
/// runs to completion; the first failure in coin order fails the whole asset.
pub async fn verify_asset<V: Verifier + ?Sized>(
    verifier: &V,
    node: &str,
    asset: &AssetBalance,
    limit: Option<&Semaphore>,
) -> Result<AssetBalance> {
    let checks = asset.unspent().iter().map(|coin| verify_coin(verifier, node, coin, limit));
    let verdicts = join_all(checks).await.into_iter().collect::<Result<Vec<bool>>>()?;

    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for (coin, ok) in asset.unspent().iter().zip(verdicts) {
        if ok { valid.push(coin.clone()) } else { invalid.push(coin.clone()) }
    }
    Ok(AssetBalance::from_parts(valid, invalid, Vec::new()))
}
