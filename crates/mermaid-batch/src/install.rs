//! Renderer availability check and installation.
//!
//! Runs once per batch, before the first diagram is converted.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{info, warn};

use crate::{
    error::BatchError,
    render::{
        Renderer,
        process::{self, ProcessResult},
    },
};

/// Resolves a program name to its path by searching `PATH`.
///
/// Returns `None` if the program is not found or `PATH` is not set.
pub fn locate(program: &str) -> Option<PathBuf> {
    locate_in(program, &env::var_os("PATH")?)
}

/// Resolves a program name against an explicit search path.
///
/// A name containing a directory component is checked as given.
pub fn locate_in(program: &str, path_var: impl AsRef<std::ffi::OsStr>) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }

    env::split_paths(&path_var)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| candidate.is_file())
}

#[cfg(windows)]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    ["", ".exe", ".cmd", ".bat"]
        .iter()
        .map(|ext| dir.join(format!("{program}{ext}")))
        .collect()
}

#[cfg(not(windows))]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program)]
}

/// Package manager invocation that installs a renderer.
#[derive(Debug, Clone)]
pub struct Installer {
    command: Vec<String>,
    timeout: Duration,
}

impl Installer {
    /// Creates an installer running `command` (program first) with a time limit.
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    /// The command as typed in a shell.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    /// Runs the package manager.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InstallFailed`] if the package manager is
    /// missing, exits with an error, or exceeds the timeout.
    pub fn install(&self, guidance: &str) -> Result<(), BatchError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(self.failed("no install command configured", guidance));
        };

        info!(command = self.command_line(), timeout_secs = self.timeout.as_secs(); "Installing renderer");

        match process::run(program, args, Some(self.timeout)) {
            ProcessResult::Exited { status, .. } if status.success() => Ok(()),
            ProcessResult::Exited {
                status,
                stdout,
                stderr,
            } => Err(self.failed(
                &format!(
                    "exited with {status}: {}",
                    ProcessResult::diagnostics(&stdout, &stderr)
                ),
                guidance,
            )),
            ProcessResult::NotFound => Err(self.failed(&format!("`{program}` not found"), guidance)),
            ProcessResult::TimedOut { after, .. } => {
                Err(self.failed(&format!("timed out after {after:?}"), guidance))
            }
            ProcessResult::Failed(err) => Err(self.failed(&err.to_string(), guidance)),
        }
    }

    fn failed(&self, reason: &str, guidance: &str) -> BatchError {
        BatchError::InstallFailed {
            command: self.command_line(),
            reason: reason.to_string(),
            guidance: guidance.to_string(),
        }
    }
}

/// Makes sure the renderer can be run, installing it if allowed.
///
/// # Arguments
///
/// * `renderer` - The renderer the batch will use
/// * `installer` - Package manager to try when the renderer is missing;
///   ignored for renderers that are not installable
///
/// # Errors
///
/// Returns [`BatchError::InstallFailed`] if installation fails and
/// [`BatchError::RendererMissing`] if the renderer is still unavailable.
pub fn ensure_available(
    renderer: &dyn Renderer,
    installer: Option<&Installer>,
) -> Result<(), BatchError> {
    if renderer.is_available() {
        return Ok(());
    }

    let program = renderer.program();
    let guidance = renderer.guidance();
    warn!(program; "Renderer not found on PATH");

    let missing = || BatchError::RendererMissing {
        program: program.to_string(),
        guidance: guidance.clone(),
    };

    let Some(installer) = installer.filter(|_| renderer.installable()) else {
        return Err(missing());
    };

    installer.install(&guidance)?;

    if renderer.is_available() {
        info!(program; "Renderer installed");
        Ok(())
    } else {
        Err(missing())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::render::{RenderOutcome, RenderRequest};

    struct StubRenderer {
        available: bool,
        installable: bool,
        /// When set, availability is a real lookup in this directory.
        search_path: Option<PathBuf>,
    }

    impl Renderer for StubRenderer {
        fn program(&self) -> &str {
            "stub-mmdc"
        }

        fn render(&self, _request: &RenderRequest) -> RenderOutcome {
            RenderOutcome::NotFound(self.program().to_string())
        }

        fn guidance(&self) -> String {
            "install stub-mmdc".to_string()
        }

        fn installable(&self) -> bool {
            self.installable
        }

        fn is_available(&self) -> bool {
            match &self.search_path {
                Some(dir) => locate_in(self.program(), dir).is_some(),
                None => self.available,
            }
        }
    }

    fn stub(available: bool, installable: bool) -> StubRenderer {
        StubRenderer {
            available,
            installable,
            search_path: None,
        }
    }

    #[test]
    fn test_locate_in_search_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fake-mmdc"), "").unwrap();

        assert_eq!(
            locate_in("fake-mmdc", dir.path()),
            Some(dir.path().join("fake-mmdc"))
        );
        assert_eq!(locate_in("other", dir.path()), None);
        assert_eq!(locate_in("", dir.path()), None);
    }

    #[test]
    fn test_locate_explicit_path() {
        let dir = tempdir().unwrap();
        let program = dir.path().join("fake-mmdc");
        fs::write(&program, "").unwrap();

        let program = program.to_string_lossy();
        assert!(locate_in(&program, "").is_some());
    }

    #[test]
    fn test_available_renderer_skips_install() {
        let installer = Installer::new(
            vec!["mermaid-batch-absent-npm".to_string()],
            Duration::from_secs(1),
        );
        assert!(ensure_available(&stub(true, true), Some(&installer)).is_ok());
    }

    #[test]
    fn test_not_installable_is_missing() {
        let installer = Installer::new(vec!["true".to_string()], Duration::from_secs(1));
        let err = ensure_available(&stub(false, false), Some(&installer)).unwrap_err();

        assert!(matches!(err, BatchError::RendererMissing { .. }), "{err:?}");
        assert_eq!(err.guidance(), Some("install stub-mmdc"));
    }

    #[test]
    fn test_missing_package_manager_fails_install() {
        let installer = Installer::new(
            vec!["mermaid-batch-absent-npm".to_string(), "install".to_string()],
            Duration::from_secs(1),
        );
        let err = ensure_available(&stub(false, true), Some(&installer)).unwrap_err();

        let BatchError::InstallFailed { command, reason, .. } = err else {
            panic!("Expected InstallFailed, got {err:?}");
        };
        assert_eq!(command, "mermaid-batch-absent-npm install");
        assert!(reason.contains("not found"), "{reason}");
    }

    #[cfg(unix)]
    #[test]
    fn test_install_succeeds_but_renderer_still_missing() {
        let installer = Installer::new(
            ["sh", "-c", "exit 0"].map(String::from).to_vec(),
            Duration::from_secs(10),
        );
        let err = ensure_available(&stub(false, true), Some(&installer)).unwrap_err();
        assert!(matches!(err, BatchError::RendererMissing { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_install_makes_renderer_available() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("installs.log");
        let script = format!(
            "echo run >> '{}'; touch '{}'",
            log.display(),
            dir.path().join("stub-mmdc").display()
        );
        let installer = Installer::new(
            vec!["sh".to_string(), "-c".to_string(), script],
            Duration::from_secs(10),
        );
        let renderer = StubRenderer {
            available: false,
            installable: true,
            search_path: Some(dir.path().to_path_buf()),
        };

        assert!(!renderer.is_available());
        ensure_available(&renderer, Some(&installer)).unwrap();

        assert!(renderer.is_available());
        assert_eq!(fs::read_to_string(&log).unwrap(), "run\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_install_timeout() {
        let installer = Installer::new(
            ["sh", "-c", "exec sleep 10"].map(String::from).to_vec(),
            Duration::from_millis(200),
        );
        let err = installer.install("retry by hand").unwrap_err();

        assert!(err.to_string().contains("timed out"), "{err}");
        assert_eq!(err.guidance(), Some("retry by hand"));
    }

    #[test]
    fn test_no_installer_is_missing() {
        let err = ensure_available(&stub(false, true), None).unwrap_err();
        assert!(matches!(err, BatchError::RendererMissing { .. }), "{err:?}");
    }
}
