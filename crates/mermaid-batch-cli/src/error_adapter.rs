//! Error adapter for converting BatchError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Remediation steps
//! carried by renderer errors are surfaced as the diagnostic's help text.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use mermaid_batch::BatchError;

/// Adapter rendering a [`BatchError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a BatchError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            BatchError::Io(_) => "mermaid_batch::io",
            BatchError::Config(_) => "mermaid_batch::config",
            BatchError::Serialize(_) => "mermaid_batch::serialize",
            BatchError::RendererMissing { .. } => "mermaid_batch::renderer_missing",
            BatchError::InstallFailed { .. } => "mermaid_batch::install_failed",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.0
            .guidance()
            .map(|guidance| Box::new(guidance) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Renders `err` with miette's graphical report handler.
pub fn render_report(err: &BatchError) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    if reporter
        .render_report(&mut writer, &ErrorAdapter(err))
        .is_err()
    {
        return err.to_string();
    }
    writer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_missing_has_help() {
        let err = BatchError::RendererMissing {
            program: "mmdc".to_string(),
            guidance: "npm install -g @mermaid-js/mermaid-cli".to_string(),
        };
        let adapter = ErrorAdapter(&err);

        assert_eq!(
            adapter.code().map(|c| c.to_string()).as_deref(),
            Some("mermaid_batch::renderer_missing")
        );
        assert_eq!(
            adapter.help().map(|h| h.to_string()).as_deref(),
            Some("npm install -g @mermaid-js/mermaid-cli")
        );
        assert_eq!(adapter.to_string(), "Renderer `mmdc` is not available");
    }

    #[test]
    fn test_config_error_has_no_help() {
        let err = BatchError::Config("bad color".to_string());
        let adapter = ErrorAdapter(&err);

        assert!(adapter.help().is_none());
        assert_eq!(
            adapter.code().map(|c| c.to_string()).as_deref(),
            Some("mermaid_batch::config")
        );
    }

    #[test]
    fn test_report_contains_message_and_help() {
        let err = BatchError::InstallFailed {
            command: "npm i".to_string(),
            reason: "timed out after 120s".to_string(),
            guidance: "Install it by hand".to_string(),
        };

        let report = render_report(&err);

        assert!(report.contains("timed out after 120s"), "{report}");
        assert!(report.contains("Install it by hand"), "{report}");
    }
}
