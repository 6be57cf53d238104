use std::collections::{BTreeMap, HashMap, HashSet};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Serialize, Deserialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use crate::{
    asset::{AssetBalance, AssetBalanceSnapshot},
    coin::Coin,
    config,
    error::{LedgerError, LedgerResult},
    registry,
    transaction::LedgerTx,
    verify::{self, Verifier},
};

/// Network name used when a balance is not bound to any network.
pub const NO_NET: &str = "NoNet";

/// Plain record form of a [`Balance`], suitable for JSON or binary storage.
/// Missing fields default to empty (and `net` to [`NO_NET`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub address: String,
    pub net: String,
    pub asset_symbols: Vec<String>,
    pub assets: BTreeMap<String, AssetBalanceSnapshot>,
    pub token_symbols: Vec<String>,
    pub tokens: BTreeMap<String, Decimal>,
}

impl Default for BalanceSnapshot {
    fn default() -> Self {
        BalanceSnapshot {
            address: String::new(),
            net: NO_NET.to_string(),
            asset_symbols: Vec::new(),
            assets: BTreeMap::new(),
            token_symbols: Vec::new(),
            tokens: BTreeMap::new(),
        }
    }
}

/// Everything an account holds: UTXO assets by symbol and token amounts by
/// symbol.
///
/// Symbols are stored upper-case. The order lists record every `add_*` call,
/// so adding a symbol twice lists it twice while the map keeps only the latest
/// entry. Iteration over assets follows the order list.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    address: String,
    net: String,
    asset_symbols: Vec<String>,
    assets: HashMap<String, AssetBalance>,
    token_symbols: Vec<String>,
    tokens: HashMap<String, Decimal>,
}

impl Default for Balance {
    fn default() -> Self {
        Balance::new("", NO_NET)
    }
}

impl Balance {
    pub fn new(address: impl Into<String>, net: impl Into<String>) -> Self {
        Balance {
            address: address.into(),
            net: net.into(),
            asset_symbols: Vec::new(),
            assets: HashMap::new(),
            token_symbols: Vec::new(),
            tokens: HashMap::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn net(&self) -> &str {
        &self.net
    }

    pub fn asset_symbols(&self) -> &[String] {
        &self.asset_symbols
    }

    pub fn assets(&self) -> &HashMap<String, AssetBalance> {
        &self.assets
    }

    /// Case-insensitive asset lookup.
    pub fn asset(&self, symbol: &str) -> Option<&AssetBalance> {
        self.assets.get(&symbol.to_uppercase())
    }

    pub fn token_symbols(&self) -> &[String] {
        &self.token_symbols
    }

    pub fn tokens(&self) -> &HashMap<String, Decimal> {
        &self.tokens
    }

    /// Case-insensitive token lookup.
    pub fn token(&self, symbol: &str) -> Option<Decimal> {
        self.tokens.get(&symbol.to_uppercase()).copied()
    }

    /// Register an asset, replacing any existing entry for the symbol. The
    /// symbol is appended to the order list even if already present.
    pub fn add_asset(&mut self, symbol: &str, snapshot: Option<AssetBalanceSnapshot>) -> &mut Self {
        let symbol = symbol.to_uppercase();
        let asset = AssetBalance::from_snapshot(snapshot.unwrap_or_default());
        self.asset_symbols.push(symbol.clone());
        self.assets.insert(symbol, asset);
        self
    }

    /// Register a token amount with the same append-always semantics as
    /// [`Balance::add_asset`].
    pub fn add_token(&mut self, symbol: &str, amount: impl Into<Decimal>) -> &mut Self {
        let symbol = symbol.to_uppercase();
        self.token_symbols.push(symbol.clone());
        self.tokens.insert(symbol, amount.into());
        self
    }

    /// Apply an observed transaction.
    ///
    /// Inputs are spent first: each one moves the matching unspent coin of the
    /// first asset (in symbol order) that holds it to `spent`. Inputs nobody
    /// holds are skipped. Outputs are then received as coins `(tx hash, i)`:
    /// confirmed outputs land in `unspent` (replacing any pending copy),
    /// unconfirmed ones in `unconfirmed`.
    ///
    /// Every output's asset id is resolved before anything changes, so an
    /// [`LedgerError::UnknownAsset`] leaves the balance untouched. Applying the
    /// same confirmed transaction twice duplicates its outputs; callers
    /// deduplicate by hash.
    pub fn apply_tx<T: LedgerTx + ?Sized>(&mut self, tx: &T, confirmed: bool) -> LedgerResult<&mut Self> {
        let symbols = tx
            .outputs()
            .iter()
            .map(|out| {
                registry::symbol_for(&out.asset_id)
                    .ok_or_else(|| LedgerError::UnknownAsset(out.asset_id.clone()))
            })
            .collect::<LedgerResult<Vec<_>>>()?;
        let hash = tx.hash();

        for input in tx.inputs() {
            let mut owned = false;
            for symbol in &self.asset_symbols {
                if let Some(asset) = self.assets.get_mut(symbol) {
                    if asset.spend(&input.prev_hash, input.prev_index) {
                        owned = true;
                        break;
                    }
                }
            }
            if !owned {
                debug!("input {}:{} not held by this wallet", input.prev_hash, input.prev_index);
            }
        }

        for (i, (output, symbol)) in tx.outputs().iter().zip(symbols).enumerate() {
            if !self.assets.contains_key(symbol) {
                self.add_asset(symbol, None);
            }
            let coin = Coin::new(hash, i as u32, output.value);
            if let Some(asset) = self.assets.get_mut(symbol) {
                if confirmed {
                    asset.receive_confirmed(coin);
                } else {
                    asset.receive_unconfirmed(coin);
                }
            }
        }
        debug!("📥 applied tx {} (confirmed={})", hash, confirmed);
        Ok(self)
    }

    /// A block landed: every pending coin of every asset becomes unspent.
    pub fn confirm(&mut self) -> &mut Self {
        let moved: usize = self.assets.values_mut().map(AssetBalance::confirm_all).sum();
        if moved > 0 {
            info!("✅ confirmed {} pending coin(s)", moved);
        }
        self
    }

    /// Reconcile every asset's unspent coins against `node`, all lookups in
    /// flight at once. See [`Balance::verify_assets_bounded`].
    pub async fn verify_assets<V: Verifier + ?Sized>(&mut self, node: &str, verifier: &V) -> LedgerResult<&mut Self> {
        self.verify_assets_bounded(node, verifier, 0).await
    }

    /// Reconcile every asset's unspent coins against `node` with at most
    /// `limit` lookups in flight (0 means no limit).
    ///
    /// Each asset is replaced wholesale: verified coins become its `unspent`,
    /// rejected coins its `spent`, and `unconfirmed` is emptied. An asset whose
    /// lookups did not all complete keeps its previous state; the call then
    /// returns [`LedgerError::Verification`] naming those assets after the
    /// others have been committed.
    pub async fn verify_assets_bounded<V: Verifier + ?Sized>(
        &mut self,
        node: &str,
        verifier: &V,
        limit: usize,
    ) -> LedgerResult<&mut Self> {
        let semaphore = (limit > 0).then(|| Semaphore::new(limit));
        let mut seen = HashSet::new();
        let symbols: Vec<String> = self
            .asset_symbols
            .iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();

        let results = {
            let assets = &self.assets;
            let sem = semaphore.as_ref();
            let batches = symbols.iter().filter_map(|symbol| {
                assets.get(symbol).map(|asset| async move {
                    (symbol.clone(), verify::verify_asset(verifier, node, asset, sem).await)
                })
            });
            join_all(batches).await
        };

        let mut failed = Vec::new();
        let mut first_error = None;
        for (symbol, result) in results {
            match result {
                Ok(replacement) => {
                    debug!("🔁 {} verified: {} unspent, {} rejected", symbol, replacement.unspent().len(), replacement.spent().len());
                    self.assets.insert(symbol, replacement);
                }
                Err(e) => {
                    warn!("⚠️  verification of {} against {} failed: {:#}", symbol, node, e);
                    failed.push(symbol);
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(LedgerError::Verification { failed, source: e });
        }
        info!("🔎 verified {} asset(s) against {}", symbols.len(), node);
        Ok(self)
    }

    /// [`Balance::verify_assets_bounded`] against the configured node and
    /// concurrency limit.
    pub async fn verify_with_config<V: Verifier + ?Sized>(
        &mut self,
        cfg: &config::Verify,
        verifier: &V,
    ) -> LedgerResult<&mut Self> {
        self.verify_assets_bounded(&cfg.node, verifier, cfg.concurrency).await
    }

    /// Rebuild from a snapshot, replaying `add_asset`/`add_token` in the
    /// recorded order. Symbols that appear only as map keys are ignored.
    pub fn from_snapshot(snapshot: BalanceSnapshot) -> Self {
        let mut balance = Balance::new(snapshot.address, snapshot.net);
        for symbol in &snapshot.asset_symbols {
            let asset = snapshot
                .assets
                .get(symbol)
                .or_else(|| snapshot.assets.get(&symbol.to_uppercase()))
                .cloned();
            balance.add_asset(symbol, asset);
        }
        for symbol in &snapshot.token_symbols {
            let amount = snapshot
                .tokens
                .get(symbol)
                .or_else(|| snapshot.tokens.get(&symbol.to_uppercase()))
                .copied()
                .unwrap_or(Decimal::ZERO);
            balance.add_token(symbol, amount);
        }
        balance
    }

    pub fn export(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            address: self.address.clone(),
            net: self.net.clone(),
            asset_symbols: self.asset_symbols.clone(),
            assets: self.assets.iter().map(|(k, v)| (k.clone(), v.export())).collect(),
            token_symbols: self.token_symbols.clone(),
            tokens: self.tokens.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }

    pub fn to_json(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    /// Fails without partial state if any field has the wrong type.
    pub fn from_json(text: &str) -> LedgerResult<Self> {
        let snapshot: BalanceSnapshot = serde_json::from_str(text)?;
        Ok(Balance::from_snapshot(snapshot))
    }

    /// Compact bincode encoding of the snapshot record.
    pub fn to_bytes(&self) -> LedgerResult<Vec<u8>> {
        Ok(bincode::serialize(&self.export())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        let snapshot: BalanceSnapshot = bincode::deserialize(bytes)?;
        Ok(Balance::from_snapshot(snapshot))
    }
}
