use serde::Deserialize;
use std::{fs, path::Path};
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub ledger: Ledger,
    #[serde(default)]
    pub verify: Verify,
    #[serde(default)]
    pub metrics: Metrics,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Ledger {
    pub snapshot: String,               // JSON snapshot path
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_net")]
    pub net: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Verify {
    #[serde(default = "default_node")]
    pub node: String,
    /// Max remote lookups in flight; 0 means unbounded.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Metrics {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for Verify {
    fn default() -> Self {
        Verify { node: default_node(), concurrency: default_concurrency() }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics { bind: default_bind() }
    }
}

fn default_net() -> String { crate::balance::NO_NET.into() }
fn default_node() -> String { "http://127.0.0.1:10332".into() }
fn default_concurrency() -> usize { 16 }
fn default_bind() -> String { "127.0.0.1:9100".into() }

/// Read the TOML file at `p` and deserialize into `Config`.
///
/// # Errors
/// * Returns an anyhow::Error if the file cannot be read or parsed.
pub fn load<P: AsRef<Path>>(p: P) -> Result<Config> {
    let text = fs::read_to_string(&p)
        .with_context(|| format!("🗂️  couldn't read config file {}", p.as_ref().display()))?;
    load_from_str(&text)
}

pub fn load_from_str(text: &str) -> Result<Config> {
    toml::from_str(text)
        .with_context(|| "📝  invalid TOML in config file".to_string())
}
