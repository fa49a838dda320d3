//! Configuration types for batch conversion.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default, so an empty document is valid.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`RendererConfig`] - Which renderer backend runs and how it is invoked.
//! - [`OutputConfig`] - Resolution, scale policy and fallback behaviour.
//! - [`ThemeConfig`] - Theme handed to the renderer.
//!
//! # Example
//!
//! ```
//! # use mermaid_batch::config::{AppConfig, Backend};
//! let config = AppConfig::default();
//! assert_eq!(config.renderer().backend(), Backend::Local);
//! assert_eq!(config.output().resolution(), 300);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::{
    error::BatchError,
    scale::{DEFAULT_WIDTH_FACTOR, ScalePolicy},
    theme::ThemeConfig,
};

/// Default image for the [`Backend::Docker`] renderer.
pub const DEFAULT_DOCKER_IMAGE: &str = "minlag/mermaid-cli";

/// Default per-diagram timeout for the [`Backend::Local`] renderer.
pub const DEFAULT_LOCAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for the renderer installation step.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Renderer configuration section.
    #[serde(default)]
    renderer: RendererConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,

    /// Theme configuration section.
    #[serde(default)]
    theme: ThemeConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(renderer: RendererConfig, output: OutputConfig, theme: ThemeConfig) -> Self {
        Self {
            renderer,
            output,
            theme,
        }
    }

    /// Returns the renderer configuration.
    pub fn renderer(&self) -> &RendererConfig {
        &self.renderer
    }

    /// Returns the renderer configuration for overriding.
    pub fn renderer_mut(&mut self) -> &mut RendererConfig {
        &mut self.renderer
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the output configuration for overriding.
    pub fn output_mut(&mut self) -> &mut OutputConfig {
        &mut self.output
    }

    /// Returns the theme configuration.
    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    /// Checks the whole configuration for values the renderer cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Config`] for a zero resolution or width factor,
    /// an empty command, or an invalid theme colour.
    pub fn validate(&self) -> Result<(), BatchError> {
        self.renderer.validate()?;
        self.output.validate()?;
        self.theme.validate()
    }
}

/// Renderer backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Run the Mermaid CLI container image through `docker`.
    Docker,
    /// Run a locally installed Mermaid CLI command.
    #[default]
    Local,
}

/// How the external renderer is located and invoked.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    backend: Backend,

    /// Container image for [`Backend::Docker`].
    docker_image: String,

    /// Command and leading arguments for [`Backend::Local`].
    local_command: Vec<String>,

    /// Per-diagram timeout in seconds. `0` disables the timeout; when absent
    /// the backend default applies.
    timeout_secs: Option<u64>,

    /// Whether a missing local renderer should be installed automatically.
    auto_install: bool,

    /// Package manager command installing the local renderer.
    install_command: Vec<String>,

    install_timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            docker_image: DEFAULT_DOCKER_IMAGE.to_string(),
            local_command: vec!["mmdc".to_string()],
            timeout_secs: None,
            auto_install: true,
            install_command: ["npm", "install", "-g", "@mermaid-js/mermaid-cli"]
                .map(String::from)
                .to_vec(),
            install_timeout_secs: DEFAULT_INSTALL_TIMEOUT.as_secs(),
        }
    }
}

impl RendererConfig {
    /// Returns the selected backend.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Overrides the selected backend.
    pub fn set_backend(&mut self, backend: Backend) {
        self.backend = backend;
    }

    /// Returns the container image used by [`Backend::Docker`].
    pub fn docker_image(&self) -> &str {
        &self.docker_image
    }

    /// Returns the command (program followed by leading arguments) used by
    /// [`Backend::Local`].
    pub fn local_command(&self) -> &[String] {
        &self.local_command
    }

    /// Overrides the local command.
    pub fn set_local_command(&mut self, command: Vec<String>) {
        self.local_command = command;
    }

    /// Returns the effective per-diagram timeout.
    ///
    /// Without an explicit value the local backend waits
    /// [`DEFAULT_LOCAL_TIMEOUT`] and the docker backend waits indefinitely.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => match self.backend {
                Backend::Local => Some(DEFAULT_LOCAL_TIMEOUT),
                Backend::Docker => None,
            },
        }
    }

    /// Overrides the per-diagram timeout; `None` disables it.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout_secs = Some(timeout.map_or(0, |t| t.as_secs().max(1)));
    }

    /// Returns whether a missing renderer should be installed automatically.
    pub fn auto_install(&self) -> bool {
        self.auto_install
    }

    /// Enables or disables automatic installation.
    pub fn set_auto_install(&mut self, auto_install: bool) {
        self.auto_install = auto_install;
    }

    /// Returns the package manager command installing the renderer.
    pub fn install_command(&self) -> &[String] {
        &self.install_command
    }

    /// Returns the installation timeout.
    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    fn validate(&self) -> Result<(), BatchError> {
        if self.local_command.first().is_none_or(|program| program.is_empty()) {
            return Err(BatchError::Config(
                "renderer.local_command must name a program".to_string(),
            ));
        }
        if self.docker_image.trim().is_empty() {
            return Err(BatchError::Config(
                "renderer.docker_image must not be empty".to_string(),
            ));
        }
        if self.auto_install && self.install_command.is_empty() {
            return Err(BatchError::Config(
                "renderer.install_command must not be empty when auto_install is enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Scale policy selector as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalePolicyKind {
    /// See [`ScalePolicy::Ppi`].
    #[default]
    Ppi,
    /// See [`ScalePolicy::Width`].
    Width,
}

/// Output settings shared by every diagram in a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Resolution in PPI.
    resolution: u32,

    scale_policy: ScalePolicyKind,

    /// Multiplier used by [`ScalePolicyKind::Width`].
    width_factor: u32,

    /// Whether a failed render leaves an HTML page for manual capture.
    fallback_html: bool,

    /// File name of the renderer configuration written to the output directory.
    config_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            resolution: 300,
            scale_policy: ScalePolicyKind::default(),
            width_factor: DEFAULT_WIDTH_FACTOR,
            fallback_html: true,
            config_file_name: "mermaid-config.json".to_string(),
        }
    }
}

impl OutputConfig {
    /// Returns the resolution in PPI.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Overrides the resolution.
    pub fn set_resolution(&mut self, resolution: u32) {
        self.resolution = resolution;
    }

    /// Returns the effective [`ScalePolicy`].
    pub fn scale_policy(&self) -> ScalePolicy {
        match self.scale_policy {
            ScalePolicyKind::Ppi => ScalePolicy::Ppi,
            ScalePolicyKind::Width => ScalePolicy::Width {
                factor: self.width_factor,
            },
        }
    }

    /// Overrides the scale policy kind; the configured width factor is kept.
    pub fn set_scale_policy(&mut self, kind: ScalePolicyKind) {
        self.scale_policy = kind;
    }

    /// Returns whether the HTML fallback is produced on failure.
    pub fn fallback_html(&self) -> bool {
        self.fallback_html
    }

    /// Enables or disables the HTML fallback.
    pub fn set_fallback_html(&mut self, enabled: bool) {
        self.fallback_html = enabled;
    }

    /// Returns the renderer configuration file name.
    pub fn config_file_name(&self) -> &str {
        &self.config_file_name
    }

    fn validate(&self) -> Result<(), BatchError> {
        if self.resolution == 0 {
            return Err(BatchError::Config(
                "output.resolution must be greater than zero".to_string(),
            ));
        }
        if self.scale_policy == ScalePolicyKind::Width && self.width_factor == 0 {
            return Err(BatchError::Config(
                "output.width_factor must be greater than zero".to_string(),
            ));
        }
        let name = self.config_file_name.as_str();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(BatchError::Config(format!(
                "output.config_file_name `{name}` must be a plain file name"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_timeout_defaults_to_thirty_seconds() {
        let config = RendererConfig::default();
        assert_eq!(config.backend(), Backend::Local);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_docker_has_no_default_timeout() {
        let mut config = RendererConfig::default();
        config.set_backend(Backend::Docker);
        assert_eq!(config.timeout(), None);

        config.set_timeout(Some(Duration::from_secs(5)));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));

        config.set_timeout(None);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_width_policy_uses_factor() {
        let mut output = OutputConfig::default();
        assert_eq!(output.scale_policy(), ScalePolicy::Ppi);

        output.set_scale_policy(ScalePolicyKind::Width);
        assert_eq!(output.scale_policy(), ScalePolicy::Width { factor: 3 });
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let mut config = AppConfig::default();
        config.output_mut().set_resolution(0);
        assert!(matches!(config.validate(), Err(BatchError::Config(_))));
    }

    #[test]
    fn test_empty_local_command_rejected() {
        let mut config = AppConfig::default();
        config.renderer_mut().set_local_command(Vec::new());
        assert!(matches!(config.validate(), Err(BatchError::Config(_))));
    }
}
