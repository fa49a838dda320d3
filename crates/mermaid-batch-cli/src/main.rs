//! Mermaid Batch CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use mermaid_batch_cli::{Args, error_adapter::render_report};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    // Per-diagram failures are reported by the run itself and keep exit code 0
    if let Err(err) = mermaid_batch_cli::run(&args) {
        error!("{}", render_report(&err));
        process::exit(1);
    }

    info!("Done!");
}
