//! Command-line argument definitions for the Mermaid Batch CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Flags given here override the configuration file.

use clap::{Parser, ValueEnum};

use mermaid_batch::config::{AppConfig, Backend, ScalePolicyKind};

/// Export all Mermaid diagrams in a folder to PNG files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder containing Mermaid diagrams (.mmd files)
    #[arg(help = "Folder containing Mermaid diagrams")]
    pub input: String,

    /// Folder to save PNG files (defaults to the input folder)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Image resolution in PPI (default: 300)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub resolution: Option<u32>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Renderer backend
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendArg>,

    /// How the resolution is mapped to the renderer's size argument
    #[arg(long, value_enum)]
    pub scale_policy: Option<ScalePolicyArg>,

    /// Do not write an HTML page when a diagram fails to render
    #[arg(long)]
    pub no_fallback: bool,

    /// Do not try to install a missing renderer
    #[arg(long)]
    pub no_install: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Creates arguments for `input` with every option left at its default.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: None,
            resolution: None,
            config: None,
            backend: None,
            scale_policy: None,
            no_fallback: false,
            no_install: false,
            log_level: "info".to_string(),
        }
    }

    /// Applies the flags that were given on top of `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(backend) = self.backend {
            config.renderer_mut().set_backend(backend.into());
        }
        if self.no_install {
            config.renderer_mut().set_auto_install(false);
        }
        if let Some(resolution) = self.resolution {
            config.output_mut().set_resolution(resolution);
        }
        if let Some(policy) = self.scale_policy {
            config.output_mut().set_scale_policy(policy.into());
        }
        if self.no_fallback {
            config.output_mut().set_fallback_html(false);
        }
    }
}

/// Renderer backend choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Run the minlag/mermaid-cli image through docker
    Docker,
    /// Run a locally installed mmdc
    Local,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Docker => Backend::Docker,
            BackendArg::Local => Backend::Local,
        }
    }
}

/// Scale policy choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScalePolicyArg {
    /// Scale factor of resolution / 72
    Ppi,
    /// Page width of resolution * width factor
    Width,
}

impl From<ScalePolicyArg> for ScalePolicyKind {
    fn from(arg: ScalePolicyArg) -> Self {
        match arg {
            ScalePolicyArg::Ppi => ScalePolicyKind::Ppi,
            ScalePolicyArg::Width => ScalePolicyKind::Width,
        }
    }
}
