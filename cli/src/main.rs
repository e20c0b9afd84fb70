//! UMBRA Ledger CLI
//!
//! Command-line driver for the encrypted debt ledger.
//!
//! # Usage
//!
//! ```bash
//! # Generate a 5-member committee with threshold 3
//! umbra init --members 5 --threshold 3 --out umbra.toml
//!
//! # Run admission, amortization and verified disclosure for one record
//! umbra --config umbra.toml simulate --id loan-1 --amount 1000 --rate 12 --term 24
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use commands::{InitCommand, SimulateCommand};
use config::{LogFormat, UmbraConfig};

/// UMBRA encrypted debt ledger
#[derive(Parser)]
#[command(name = "umbra")]
#[command(author = "UMBRA Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Encrypted debt ledger with committee-verified disclosure", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "UMBRA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate committee keys and a configuration
    Init(InitCommand),

    /// Run the disclosure protocol for one record
    Simulate(SimulateCommand),

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => UmbraConfig::load(path)?,
        None => UmbraConfig::default(),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let format = if cli.json_logs { LogFormat::Json } else { config.logging.format };
    logging::init(level, format)?;

    match cli.command {
        Commands::Init(cmd) => cmd.execute(),
        Commands::Simulate(cmd) => cmd.execute(&config),
        Commands::Version => {
            println!("umbra {}", env!("CARGO_PKG_VERSION"));
            println!("Disclosure: t-of-n ed25519 committee attestations");
            println!("Amortization: fixed point, scale {}", umbra_ledger::SCALE);
            Ok(())
        }
    }
}
