//! Command line runner.
//!
//! ```bash
//! # replay labelled candles through the buyer described in backtest.toml
//! backtrade run --data candles.json --config backtest.toml
//!
//! # also dump the closed orders
//! backtrade run --data candles.json --config backtest.toml --orders orders.json --verbose
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use backtrade::prelude::*;

#[derive(Parser)]
#[command(name = "backtrade")]
#[command(about = "Replay signal-labelled candles through a simulated spot or futures account", long_about = None)]
#[command(version)]
struct Cli {
    /// Log every order opened and closed
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backtest and print its summary
    Run {
        /// JSON array of candles
        #[arg(short, long)]
        data: PathBuf,

        /// TOML file with the initial funds and buyer terms
        #[arg(short, long)]
        config: PathBuf,

        /// Write the closed orders to this JSON file
        #[arg(short, long)]
        orders: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run { data, config, orders } => {
            let candles =
                get_data_from_file(&data).with_context(|| format!("reading candles from {}", data.display()))?;
            let config = BacktestConfig::from_file(&config)
                .with_context(|| format!("reading config from {}", config.display()))?;
            info!("{} candles loaded", candles.len());

            let mut backtest = Backtest::new(Arc::from_iter(candles))?;
            let mut buyer = Buyer::new(config.initial_funds, config.buyer)?;
            let report = backtest.run(&mut buyer)?;
            println!("{}", report.summary);

            if let Some(path) = orders {
                let writer = BufWriter::new(
                    File::create(&path).with_context(|| format!("creating {}", path.display()))?,
                );
                serde_json::to_writer_pretty(writer, &report.orders)?;
                info!("{} orders written to {}", report.orders.len(), path.display());
            }
        }
    }

    Ok(())
}
