//! CLI logic for the Mermaid Batch tool.
//!
//! Loads the configuration, applies command-line overrides and runs the
//! batch converter over the input folder.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, BackendArg, ScalePolicyArg};

use std::path::Path;

use log::{info, warn};

use mermaid_batch::{BatchConverter, BatchError, BatchReport};

/// Run the Mermaid Batch CLI application
///
/// Converts every Mermaid diagram in the input folder. Diagrams that fail to
/// render are logged and counted in the returned report; they do not make
/// this function fail.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `BatchError` for:
/// - Configuration loading errors
/// - An unreadable input folder or unwritable output folder
/// - A renderer that is missing and could not be installed
pub fn run(args: &Args) -> Result<BatchReport, BatchError> {
    info!(
        input_dir = args.input,
        output_dir:? = args.output;
        "Processing diagrams"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    args.apply_overrides(&mut app_config);

    let converter = BatchConverter::new(app_config);
    let report = converter.run(Path::new(&args.input), args.output.as_deref().map(Path::new))?;

    if !report.is_empty() {
        info!(
            succeeded = report.succeeded(),
            fallbacks = report.fallbacks(),
            abandoned = report.abandoned();
            "Converted {} of {} diagrams",
            report.succeeded(),
            report.jobs().len()
        );
    }
    if report.fallbacks() > 0 {
        warn!(
            "{} diagram(s) need a manual screenshot of their HTML page",
            report.fallbacks()
        );
    }

    Ok(report)
}
