use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use coinledger::{config, metrics::{self, LedgerMetrics}, Balance};

#[derive(Parser)]
#[command(author, version, about = "coinledger: wallet UTXO and token ledger")]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Only log warnings and errors
    #[arg(long, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Write an empty snapshot for the configured address and network
    Init {
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },
    /// Print per-asset and per-token totals
    Show,
    /// Promote all pending coins to unspent and rewrite the snapshot
    Confirm,
    /// Serve Prometheus gauges for the snapshot until interrupted
    Metrics {
        #[arg(long)]
        bind: Option<String>,
    },
}

fn load_balance(path: &str) -> Result<Balance> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("🗂️  couldn't read snapshot {}", path))?;
    Balance::from_json(&text).with_context(|| format!("📝  invalid snapshot {}", path))
}

fn save_balance(path: &str, balance: &Balance) -> Result<()> {
    let text = balance.to_json()?;
    std::fs::write(path, text).with_context(|| format!("couldn't write snapshot {}", path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let cfg = config::load(&cli.config)?;
    let snapshot = cfg.ledger.snapshot.as_str();

    match cli.cmd {
        Cmd::Init { force } => {
            if Path::new(snapshot).exists() && !force {
                anyhow::bail!("snapshot {} already exists (use --force to overwrite)", snapshot);
            }
            let balance = Balance::new(cfg.ledger.address.clone(), cfg.ledger.net.clone());
            save_balance(snapshot, &balance)?;
            println!("✨ Empty snapshot written to {}", snapshot);
        }
        Cmd::Show => {
            let balance = load_balance(snapshot)?;
            println!("👛 Address: {}", if balance.address().is_empty() { "(none)" } else { balance.address() });
            println!("🌐 Network: {}", balance.net());
            println!("\n💰 Assets:");
            let mut seen = std::collections::HashSet::new();
            for symbol in balance.asset_symbols() {
                if !seen.insert(symbol) { continue; }
                if let Some(asset) = balance.asset(symbol) {
                    println!(
                        "   {:<6} balance {} | unspent {} | spent {} | pending {} ({})",
                        symbol,
                        asset.balance(),
                        asset.unspent().len(),
                        asset.spent().len(),
                        asset.unconfirmed().len(),
                        asset.unconfirmed_total(),
                    );
                }
            }
            println!("\n🪙 Tokens:");
            let mut seen = std::collections::HashSet::new();
            for symbol in balance.token_symbols() {
                if !seen.insert(symbol) { continue; }
                if let Some(amount) = balance.token(symbol) {
                    println!("   {:<6} {}", symbol, amount);
                }
            }
        }
        Cmd::Confirm => {
            let mut balance = load_balance(snapshot)?;
            balance.confirm();
            save_balance(snapshot, &balance)?;
            println!("✅ Snapshot {} updated", snapshot);
        }
        Cmd::Metrics { bind } => {
            let balance = load_balance(snapshot)?;
            let gauges = LedgerMetrics::new()?;
            gauges.observe(&balance);
            let bind = bind.unwrap_or(cfg.metrics.bind);
            let handle = metrics::serve(gauges, &bind)?;
            println!("📈 Metrics at http://{}/metrics", bind);
            metrics::join_server(handle)?;
        }
    }

    Ok(())
}
