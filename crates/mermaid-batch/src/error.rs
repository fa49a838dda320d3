//! Error types for batch conversion.
//!
//! Only batch-level failures are represented here. A single diagram that
//! fails to render is reported through [`RenderOutcome`](crate::render::RenderOutcome)
//! and the job's final state, never as a [`BatchError`].

use std::io;

use thiserror::Error;

/// The main error type for batch operations.
///
/// Every variant aborts the whole run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize renderer configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Renderer `{program}` is not available")]
    RendererMissing { program: String, guidance: String },

    #[error("Failed to install renderer with `{command}`: {reason}")]
    InstallFailed {
        command: String,
        reason: String,
        guidance: String,
    },
}

impl BatchError {
    /// Operator-facing remediation steps, if the error carries any.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            Self::RendererMissing { guidance, .. } | Self::InstallFailed { guidance, .. } => {
                Some(guidance)
            }
            _ => None,
        }
    }
}
