//! Renderer backed by a locally installed Mermaid CLI.

use std::{ffi::OsString, time::Duration};

use log::debug;

use super::{RenderOutcome, RenderRequest, Renderer, mmdc_args, process};

/// Runs a local Mermaid CLI command such as `mmdc`.
///
/// The command may carry leading arguments, e.g.
/// `["npx", "-y", "@mermaid-js/mermaid-cli"]`; the conversion arguments are
/// appended after them.
#[derive(Debug, Clone)]
pub struct LocalRenderer {
    command: Vec<String>,
    timeout: Option<Duration>,
}

impl LocalRenderer {
    /// Creates a renderer for `command` (program first).
    ///
    /// # Arguments
    ///
    /// * `command` - Program followed by any leading arguments
    /// * `timeout` - Per-diagram time limit, `None` to wait indefinitely
    pub fn new(command: Vec<String>, timeout: Option<Duration>) -> Self {
        Self { command, timeout }
    }

    /// Full argument list for `request`, excluding the program.
    pub fn args(&self, request: &RenderRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.command.iter().skip(1).map(OsString::from).collect();
        args.extend(mmdc_args(
            request.input(),
            request.output(),
            request.config(),
            request.scale(),
        ));
        args
    }
}

impl Renderer for LocalRenderer {
    fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }

    fn render(&self, request: &RenderRequest) -> RenderOutcome {
        let args = self.args(request);
        debug!(program = self.program(), args:? = args; "Running local renderer");

        let result = process::run(self.program(), &args, self.timeout);
        RenderOutcome::from_process(result, self.program(), request.output())
    }

    fn guidance(&self) -> String {
        format!(
            "Install the Mermaid CLI with `npm install -g @mermaid-js/mermaid-cli` \
             and make sure `{}` is on your PATH.",
            self.program()
        )
    }

    fn installable(&self) -> bool {
        true
    }
}
