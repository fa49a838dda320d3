//! Renderer invocation.
//!
//! The [`Renderer`] trait is the single seam between the batch loop and the
//! external tool that turns a Mermaid source into an image. Two backends
//! implement it:
//!
//! - [`docker::DockerRenderer`] runs the Mermaid CLI container image.
//! - [`local::LocalRenderer`] runs a locally installed `mmdc`.
//!
//! Both report through the tagged [`RenderOutcome`], which keeps a missing
//! executable, a timeout and a failed render apart.

pub mod docker;
pub mod local;

pub(crate) mod process;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    config::{Backend, RendererConfig},
    install,
    scale::ScaleArg,
};

use process::ProcessResult;

/// Everything a renderer needs to convert one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    input: PathBuf,
    output: PathBuf,
    config: PathBuf,
    scale: ScaleArg,
}

impl RenderRequest {
    /// Creates a request.
    ///
    /// # Arguments
    ///
    /// * `input` - Path of the Mermaid source
    /// * `output` - Path the image is written to
    /// * `config` - Path of the renderer theme configuration
    /// * `scale` - Size argument derived from the resolution
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        config: impl Into<PathBuf>,
        scale: ScaleArg,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            config: config.into(),
            scale,
        }
    }

    /// Returns the Mermaid source path.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Returns the image path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Returns the theme configuration path.
    pub fn config(&self) -> &Path {
        &self.config
    }

    /// Returns the size argument.
    pub fn scale(&self) -> ScaleArg {
        self.scale
    }
}

/// Result of one render attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The image was written to the contained path.
    Success(PathBuf),
    /// The renderer executable does not exist.
    NotFound(String),
    /// The renderer was killed after running for `after`; `diagnostics`
    /// holds what it wrote before that.
    TimedOut {
        after: Duration,
        diagnostics: String,
    },
    /// The renderer failed; `code` is `None` when it was killed by a signal
    /// or could not be started.
    ExitedWithError {
        code: Option<i32>,
        diagnostics: String,
    },
}

impl RenderOutcome {
    fn from_process(result: ProcessResult, program: &str, output: &Path) -> Self {
        match result {
            ProcessResult::Exited {
                status,
                stdout,
                stderr,
            } => {
                if status.success() {
                    Self::Success(output.to_path_buf())
                } else {
                    Self::ExitedWithError {
                        code: status.code(),
                        diagnostics: ProcessResult::diagnostics(&stdout, &stderr),
                    }
                }
            }
            ProcessResult::NotFound => Self::NotFound(program.to_string()),
            ProcessResult::TimedOut {
                after,
                stdout,
                stderr,
            } => Self::TimedOut {
                after,
                diagnostics: ProcessResult::diagnostics(&stdout, &stderr),
            },
            ProcessResult::Failed(err) => Self::ExitedWithError {
                code: None,
                diagnostics: err.to_string(),
            },
        }
    }
}

/// An external tool converting Mermaid sources to images.
pub trait Renderer {
    /// Name of the executable this renderer runs.
    fn program(&self) -> &str;

    /// Converts one diagram, blocking until the tool finishes.
    fn render(&self, request: &RenderRequest) -> RenderOutcome;

    /// Steps for the operator when the renderer cannot be found.
    fn guidance(&self) -> String;

    /// Whether the renderer can be installed through a package manager.
    fn installable(&self) -> bool {
        false
    }

    /// Whether the executable can currently be found.
    fn is_available(&self) -> bool {
        install::locate(self.program()).is_some()
    }
}

/// Builds the renderer selected by `config`.
pub fn from_config(config: &RendererConfig) -> Box<dyn Renderer> {
    match config.backend() {
        Backend::Docker => Box::new(docker::DockerRenderer::new(
            config.docker_image(),
            config.timeout(),
        )),
        Backend::Local => Box::new(local::LocalRenderer::new(
            config.local_command().to_vec(),
            config.timeout(),
        )),
    }
}

/// Common trailing arguments understood by the Mermaid CLI.
fn mmdc_args(
    input: impl Into<OsString>,
    output: impl Into<OsString>,
    config: impl Into<OsString>,
    scale: ScaleArg,
) -> Vec<OsString> {
    let [scale_flag, scale_value] = scale.to_args();
    vec![
        "-i".into(),
        input.into(),
        "-o".into(),
        output.into(),
        "-c".into(),
        config.into(),
        "-b".into(),
        "transparent".into(),
        scale_flag.into(),
        scale_value.into(),
    ]
}
