use anyhow::{anyhow, Result};
use prometheus::{Registry, IntGauge, Encoder, TextEncoder};
use std::thread;
use crate::balance::Balance;

/// Gauges describing one [`Balance`]. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct LedgerMetrics {
    registry: Registry,
    pub unspent_coins: IntGauge,
    pub spent_coins: IntGauge,
    pub unconfirmed_coins: IntGauge,
    pub assets: IntGauge,
    pub tokens: IntGauge,
}

impl LedgerMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        // Prefix metrics with `coinledger_` for namespacing.
        let unspent_coins = IntGauge::new("coinledger_unspent_coins", "Coins available to spend")?;
        let spent_coins = IntGauge::new("coinledger_spent_coins", "Coins recorded as spent")?;
        let unconfirmed_coins = IntGauge::new("coinledger_unconfirmed_coins", "Coins waiting for a block")?;
        let assets = IntGauge::new("coinledger_assets", "Tracked UTXO assets")?;
        let tokens = IntGauge::new("coinledger_tokens", "Tracked tokens")?;
        for g in [&unspent_coins, &spent_coins, &unconfirmed_coins, &assets, &tokens] {
            registry.register(Box::new(g.clone()))?;
        }
        Ok(LedgerMetrics { registry, unspent_coins, spent_coins, unconfirmed_coins, assets, tokens })
    }

    /// Set every gauge from the current state of `balance`.
    pub fn observe(&self, balance: &Balance) {
        let (mut unspent, mut spent, mut pending) = (0usize, 0usize, 0usize);
        for asset in balance.assets().values() {
            unspent += asset.unspent().len();
            spent += asset.spent().len();
            pending += asset.unconfirmed().len();
        }
        self.unspent_coins.set(unspent as i64);
        self.spent_coins.set(spent as i64);
        self.unconfirmed_coins.set(pending as i64);
        self.assets.set(balance.assets().len() as i64);
        self.tokens.set(balance.tokens().len() as i64);
    }

    /// Text exposition of all gauges.
    pub fn render(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![];
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

/// Serve the gauges over HTTP on `bind` from a background thread.
pub fn serve(metrics: LedgerMetrics, bind: &str) -> Result<thread::JoinHandle<()>> {
    let server = tiny_http::Server::http(bind)
        .map_err(|e| anyhow!("🔥 could not start metrics server on {}: {}", bind, e))?;
    let header = "Content-Type: text/plain; version=0.0.4; charset=utf-8"
        .parse::<tiny_http::Header>()
        .map_err(|_| anyhow!("invalid metrics content-type header"))?;

    Ok(thread::spawn(move || {
        for request in server.incoming_requests() {
            let body = match metrics.render() {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("🔥 could not encode metrics: {}", e);
                    continue;
                }
            };
            let response = tiny_http::Response::from_data(body).with_header(header.clone());
            if let Err(e) = request.respond(response) {
                tracing::debug!("metrics client went away: {}", e);
            }
        }
    }))
}

/// Wait for the server thread from [`serve`] to finish. A panic in the
/// thread is logged and returned as an error.
pub fn join_server(handle: thread::JoinHandle<()>) -> Result<()> {
    handle.join().map_err(|panic| {
        let reason = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!("🔥 metrics server thread panicked: {}", reason);
        anyhow!("metrics server thread panicked: {}", reason)
    })
}
