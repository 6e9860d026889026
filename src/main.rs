//! ctcache - command-line front end for the two-tier analysis cache
//!
//! ctcache provides:
//! - Lookups that consult the consolidated index, then the sharded tree
//! - Cheap saves into the sharded tree
//! - A prune pass that consolidates and evicts stale entries
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn init_tracing(cli: &cli::Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(&cli);
    cli::run(cli)
}
