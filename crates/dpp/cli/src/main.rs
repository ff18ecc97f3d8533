//! dppctl - drive the Digital Product Passport ledger from the command line
//!
//! Records live as JSON files in a data directory; every invocation acts on behalf of one
//! organization and prints the resulting passport as pretty JSON.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dpp_engine::{DppLedger, StaticIdentity};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod payload;
mod store;

use commands::Commands;
use config::{CliConfig, LoggingConfig};
use store::DirectoryStore;

/// dppctl CLI
#[derive(Parser)]
#[command(name = "dppctl")]
#[command(about = "Digital Product Passport ledger CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML or JSON)
    #[arg(short, long, env = "DPP_CONFIG")]
    config: Option<String>,

    /// Organization to act as
    #[arg(long, global = true)]
    org: Option<String>,

    /// Record store directory
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    // Logs go to stderr so stdout stays parseable.
    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref()).context("loading configuration")?;

    // Override with CLI args
    if let Some(org) = cli.org {
        config.organization = org;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir.into();
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json_logs;

    init_tracing(&config.logging);

    let store = DirectoryStore::open(&config.data_dir)?;
    info!(
        organization = %config.organization,
        data_dir = %store.root().display(),
        "dppctl starting"
    );
    let ledger = DppLedger::new(
        config.ledger,
        Arc::new(store),
        Arc::new(StaticIdentity::new(config.organization)),
    );

    let document = commands::execute(cli.command, &ledger)?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
