//! bookctl - inspect booking-limit allocations.
//!
//! Reads a workload description and prints the segment partition, forward
//! allocations, inverse sizing and type-weighted tables for it. Offline
//! only: nothing here talks to a scheduler or a simulator.

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod workload_file;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
