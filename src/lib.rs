//! Makoto tools: seed data and maintenance jobs for the makoto-club store.
//!
//! Three independent batch commands share one binary:
//!
//! - `makoto seed`: write a deterministic sample dataset (stores and surveys)
//!   as MongoDB Extended JSON under `./sample/`. No database involved.
//! - `makoto normalize`: rewrite legacy industry codes on stores and surveys
//!   to the canonical labels.
//! - `makoto recalc-stats`: recompute every store's `stats` block from its
//!   approved surveys.
//!
//! The two maintenance jobs are dry-run by default and write only with
//! `--apply`.
//!
//! # Examples
//!
//! ```bash
//! # Generate sample/stores.json and sample/surveys.json
//! makoto seed
//!
//! # See what normalization would change, then do it
//! makoto normalize
//! makoto normalize --apply
//!
//! # Recompute stats against another database
//! MONGO_DB=staging makoto recalc-stats --apply
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: configuration, document store seam, write broker, signals, logging
//! - [`plugins`]: the seed generator and the two maintenance jobs

pub mod core;
pub mod plugins;

use core::config::{MaintenanceCli, MaintenanceConfig};
use core::error;
use core::interrupt::Interrupt;
use plugins::{normalize, seed, stats};

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[clap(
    name = "makoto",
    version = env!("CARGO_PKG_VERSION"),
    about = "Seed data and maintenance jobs for the makoto-club store"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write sample stores and surveys as Extended JSON under ./sample/
    Seed,
    /// Rewrite industry codes on stores and surveys to canonical labels
    Normalize(MaintenanceCli),
    /// Recompute the stats block of every store from its eligible surveys
    #[clap(name = "recalc-stats")]
    RecalcStats(MaintenanceCli),
}

pub fn run() -> Result<(), error::MakotoError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Seed => {
            let out_dir = std::env::current_dir()?.join(seed::SAMPLE_DIR);
            seed::run_seed_cli(&out_dir)
        }
        Command::Normalize(args) => {
            let config = MaintenanceConfig::from(args);
            info!(database = %config.database, mode = ?config.mode, "starting normalize");
            let interrupt = Interrupt::install()?;
            interrupt.settle(normalize::run_normalize_cli(&config, &interrupt))
        }
        Command::RecalcStats(args) => {
            let config = MaintenanceConfig::from(args);
            info!(database = %config.database, mode = ?config.mode, "starting recalc-stats");
            let interrupt = Interrupt::install()?;
            interrupt.settle(stats::run_recalc_cli(&config, &interrupt))
        }
    }
}
