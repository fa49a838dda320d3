//! The conversion loop.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::{
    config::AppConfig,
    discover::{self, SOURCE_EXTENSION},
    error::BatchError,
    fallback,
    install::{self, Installer},
    render::{self, RenderOutcome, RenderRequest, Renderer},
};

/// Final state of one conversion job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The image was written.
    Succeeded { image: PathBuf },
    /// Rendering failed and an HTML page was left for manual capture.
    FallbackProduced { html: PathBuf, reason: String },
    /// Rendering failed and nothing was produced.
    Abandoned { reason: String },
}

/// One diagram source and what became of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    source: PathBuf,
    outcome: JobOutcome,
}

impl Job {
    /// Returns the diagram source path.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the job's final state.
    pub fn outcome(&self) -> &JobOutcome {
        &self.outcome
    }

    /// Returns `true` if the image was produced.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, JobOutcome::Succeeded { .. })
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    jobs: Vec<Job>,
}

impl BatchReport {
    /// Returns every job in processing order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Returns `true` if no diagram sources were found.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of images produced.
    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|job| job.succeeded()).count()
    }

    /// Number of failed jobs that left a fallback page.
    pub fn fallbacks(&self) -> usize {
        self.count(|outcome| matches!(outcome, JobOutcome::FallbackProduced { .. }))
    }

    /// Number of failed jobs that produced nothing.
    pub fn abandoned(&self) -> usize {
        self.count(|outcome| matches!(outcome, JobOutcome::Abandoned { .. }))
    }

    /// Number of failed jobs, with or without a fallback page.
    pub fn failed(&self) -> usize {
        self.jobs.len() - self.succeeded()
    }

    fn count(&self, predicate: impl Fn(&JobOutcome) -> bool) -> usize {
        self.jobs.iter().filter(|job| predicate(&job.outcome)).count()
    }
}

/// Converts every diagram source in a directory.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use mermaid_batch::{BatchConverter, config::AppConfig};
///
/// let converter = BatchConverter::new(AppConfig::default());
/// let report = converter
///     .run(Path::new("diagrams"), None)
///     .expect("Batch aborted");
///
/// println!("{} of {} converted", report.succeeded(), report.jobs().len());
/// ```
pub struct BatchConverter {
    config: AppConfig,
    renderer: Box<dyn Renderer>,
}

impl BatchConverter {
    /// Creates a converter using the renderer selected by `config`.
    pub fn new(config: AppConfig) -> Self {
        let renderer = render::from_config(config.renderer());
        Self { config, renderer }
    }

    /// Creates a converter with an explicit renderer.
    ///
    /// The renderer section of `config` still supplies the installer.
    pub fn with_renderer(config: AppConfig, renderer: Box<dyn Renderer>) -> Self {
        Self { config, renderer }
    }

    /// Converts every diagram source in `input` into `output`.
    ///
    /// `output` defaults to `input` and is created if absent. A failed
    /// diagram is logged and recorded in the report; the loop moves on to
    /// the next one.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` for an invalid configuration, an unreadable input
    /// directory, failure to prepare the output directory or renderer
    /// configuration, and a renderer that is missing or cannot be installed.
    pub fn run(&self, input: &Path, output: Option<&Path>) -> Result<BatchReport, BatchError> {
        self.config.validate()?;

        let input = std::path::absolute(input)?;
        let output = match output {
            Some(dir) => std::path::absolute(dir)?,
            None => input.clone(),
        };

        let sources = discover::find_sources(&input)?;
        std::fs::create_dir_all(&output)?;
        if sources.is_empty() {
            info!("No .{SOURCE_EXTENSION} files found in {}", input.display());
            return Ok(BatchReport::default());
        }
        info!(count = sources.len(); "Found {} Mermaid diagram files.", sources.len());

        self.ensure_renderer()?;

        let config_path = self.prepare(&output)?;

        let jobs = sources
            .into_iter()
            .map(|source| self.convert(source, &output, &config_path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchReport { jobs })
    }

    /// Creates the output directory and writes the renderer configuration
    /// into it, returning the configuration path.
    pub fn prepare(&self, output: &Path) -> Result<PathBuf, BatchError> {
        std::fs::create_dir_all(output)?;

        let config_path = output.join(self.config.output().config_file_name());
        self.config.theme().write_to(&config_path)?;
        Ok(config_path)
    }

    fn ensure_renderer(&self) -> Result<(), BatchError> {
        let renderer_config = self.config.renderer();
        let installer = renderer_config.auto_install().then(|| {
            Installer::new(
                renderer_config.install_command().to_vec(),
                renderer_config.install_timeout(),
            )
        });

        install::ensure_available(self.renderer.as_ref(), installer.as_ref())
    }

    /// Runs one job. Only a renderer that vanished mid-batch is an error.
    fn convert(
        &self,
        source: PathBuf,
        output_dir: &Path,
        config_path: &Path,
    ) -> Result<Job, BatchError> {
        let stem = discover::source_stem(&source);
        let image = output_dir.join(format!("{stem}.png"));
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!("Converting {name} to PNG...");

        let output_config = self.config.output();
        let scale = output_config
            .scale_policy()
            .derive(output_config.resolution());
        let request = RenderRequest::new(&source, &image, config_path, scale);

        let reason = match self.renderer.render(&request) {
            RenderOutcome::Success(image) => {
                info!("Successfully created {stem}.png");
                return Ok(Job {
                    source,
                    outcome: JobOutcome::Succeeded { image },
                });
            }
            RenderOutcome::NotFound(program) => {
                return Err(BatchError::RendererMissing {
                    program,
                    guidance: self.renderer.guidance(),
                });
            }
            RenderOutcome::TimedOut { after, diagnostics } => {
                let reason = format!("renderer timed out after {after:?}");
                error!(source = name, timeout:? = after; "Error converting {name}: {reason}");
                if !diagnostics.is_empty() {
                    error!("Error output: {diagnostics}");
                }
                reason
            }
            RenderOutcome::ExitedWithError { code, diagnostics } => {
                let status = code.map_or_else(
                    || "without an exit code".to_string(),
                    |code| format!("with code {code}"),
                );
                let reason = format!("renderer exited {status}");
                error!(source = name, code:? = code; "Error converting {name}: {reason}");
                error!("Error output: {diagnostics}");
                reason
            }
        };

        Ok(Job {
            outcome: self.fail(&source, output_dir, &stem, reason),
            source,
        })
    }

    fn fail(&self, source: &Path, output_dir: &Path, stem: &str, reason: String) -> JobOutcome {
        if !self.config.output().fallback_html() {
            debug!(stem; "HTML fallback disabled");
            return JobOutcome::Abandoned { reason };
        }

        let html = output_dir.join(format!("{stem}.html"));
        match fallback::write_fallback(source, &html, self.config.theme().name()) {
            Ok(()) => {
                warn!(
                    "Created fallback page {}. Open it in a browser and take a screenshot to produce {stem}.png",
                    html.display()
                );
                JobOutcome::FallbackProduced { html, reason }
            }
            Err(err) => {
                error!(stem; "Failed to write fallback page: {err}");
                JobOutcome::Abandoned { reason }
            }
        }
    }
}
