//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use mermaid_batch::{BatchError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for BatchError {
    fn from(err: ConfigError) -> Self {
        BatchError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (mermaid-batch/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path to config file
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, BatchError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("mermaid-batch/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "mermaid-batch", "mermaid-batch") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, BatchError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use mermaid_batch::{config::Backend, scale::ScalePolicy};

    use super::*;

    #[test]
    fn test_full_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[renderer]
backend = "docker"
docker_image = "ghcr.io/mermaid-js/mermaid-cli"
timeout_secs = 90
auto_install = false

[output]
resolution = 150
scale_policy = "width"
width_factor = 4
fallback_html = false

[theme]
name = "forest"

[theme.variables]
primaryColor = "#112233"
"##,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.renderer().backend(), Backend::Docker);
        assert_eq!(config.renderer().docker_image(), "ghcr.io/mermaid-js/mermaid-cli");
        assert_eq!(config.renderer().timeout(), Some(Duration::from_secs(90)));
        assert!(!config.renderer().auto_install());
        assert_eq!(config.output().resolution(), 150);
        assert_eq!(config.output().scale_policy(), ScalePolicy::Width { factor: 4 });
        assert!(!config.output().fallback_html());
        assert_eq!(config.theme().name(), "forest");
        assert_eq!(config.theme().variables().len(), 1);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nresolution = 600\n").unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.output().resolution(), 600);
        assert!(config.output().fallback_html());
        assert_eq!(config.renderer().local_command(), ["mmdc"]);
        assert_eq!(config.theme().name(), "dark");
        assert_eq!(config.theme().variables().len(), 6);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"), "{err}");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[renderer]\nbackend = \"podman\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, BatchError::Config(_)), "{err:?}");
    }
}
