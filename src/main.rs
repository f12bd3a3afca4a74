mod analysis;
mod clean;
mod config;
mod integrate;
mod manager;
mod metrics;
mod model;
mod plot;
mod seed;
mod stats;
mod store;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Seed,

    Analyze,

    Plot,

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.data_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Seed => mgr.seed_measurements()?,
        Command::Analyze => mgr.analyze_measurements()?,
        Command::Plot => mgr.plot_results()?,
        Command::Clean => mgr.clean_outputs()?,
    }

    Ok(())
}
