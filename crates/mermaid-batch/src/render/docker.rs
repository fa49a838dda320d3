//! Renderer backed by the Mermaid CLI container image.
//!
//! The input and output directories are bind-mounted into the container at
//! fixed locations, and every path handed to the Mermaid CLI is rewritten to
//! its in-container counterpart.

use std::{
    ffi::OsString,
    io,
    path::{self, Path, PathBuf},
    time::Duration,
};

use log::debug;

use super::{RenderOutcome, RenderRequest, Renderer, mmdc_args, process};

const DOCKER: &str = "docker";
const CONTAINER_INPUT_DIR: &str = "/data/input";
const CONTAINER_OUTPUT_DIR: &str = "/data/output";

/// Runs the Mermaid CLI through `docker run --rm`.
#[derive(Debug, Clone)]
pub struct DockerRenderer {
    image: String,
    timeout: Option<Duration>,
}

impl DockerRenderer {
    /// Creates a renderer for the given container image.
    pub fn new(image: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            image: image.into(),
            timeout,
        }
    }

    /// Full `docker` argument list for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if a request path cannot be made absolute or has no
    /// file name.
    pub fn args(&self, request: &RenderRequest) -> io::Result<Vec<OsString>> {
        let (input_dir, input_name) = split(request.input())?;
        let (output_dir, output_name) = split(request.output())?;
        let (_, config_name) = split(request.config())?;

        let mut args: Vec<OsString> = vec!["run".into(), "--rm".into()];
        args.push("-v".into());
        args.push(mount(&input_dir, CONTAINER_INPUT_DIR));
        args.push("-v".into());
        args.push(mount(&output_dir, CONTAINER_OUTPUT_DIR));
        args.push(self.image.as_str().into());
        args.extend(mmdc_args(
            in_container(CONTAINER_INPUT_DIR, &input_name),
            in_container(CONTAINER_OUTPUT_DIR, &output_name),
            in_container(CONTAINER_OUTPUT_DIR, &config_name),
            request.scale(),
        ));
        Ok(args)
    }
}

impl Renderer for DockerRenderer {
    fn program(&self) -> &str {
        DOCKER
    }

    fn render(&self, request: &RenderRequest) -> RenderOutcome {
        let args = match self.args(request) {
            Ok(args) => args,
            Err(err) => {
                return RenderOutcome::ExitedWithError {
                    code: None,
                    diagnostics: err.to_string(),
                };
            }
        };
        debug!(image = self.image.as_str(), args:? = args; "Running containerized renderer");

        let result = process::run(DOCKER, &args, self.timeout);
        RenderOutcome::from_process(result, DOCKER, request.output())
    }

    fn guidance(&self) -> String {
        "Install Docker from https://www.docker.com/products/docker-desktop/ \
         and make sure the `docker` command is on your PATH."
            .to_string()
    }
}

/// Splits a path into its absolute parent directory and file name.
fn split(path: &Path) -> io::Result<(PathBuf, OsString)> {
    let absolute = path::absolute(path)?;
    match (absolute.parent(), absolute.file_name()) {
        (Some(dir), Some(name)) => Ok((dir.to_path_buf(), name.to_os_string())),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("`{}` does not name a file", path.display()),
        )),
    }
}

fn mount(host_dir: &Path, container_dir: &str) -> OsString {
    let mut spec = host_dir.as_os_str().to_os_string();
    spec.push(":");
    spec.push(container_dir);
    spec
}

fn in_container(container_dir: &str, name: &OsString) -> OsString {
    let mut path = OsString::from(container_dir);
    path.push("/");
    path.push(name);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ScaleArg;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_container_arguments() {
        let renderer = DockerRenderer::new("minlag/mermaid-cli", None);
        let request = RenderRequest::new(
            "/work/diagrams/flow.mmd",
            "/work/out/flow.png",
            "/work/out/mermaid-config.json",
            ScaleArg::Scale(300.0 / 72.0),
        );

        let args = strings(&renderer.args(&request).unwrap());

        assert_eq!(
            args,
            [
                "run",
                "--rm",
                "-v",
                "/work/diagrams:/data/input",
                "-v",
                "/work/out:/data/output",
                "minlag/mermaid-cli",
                "-i",
                "/data/input/flow.mmd",
                "-o",
                "/data/output/flow.png",
                "-c",
                "/data/output/mermaid-config.json",
                "-b",
                "transparent",
                "-s",
                "4.166666666666667",
            ]
        );
    }

    #[test]
    fn test_relative_paths_are_absolutized() {
        let renderer = DockerRenderer::new("minlag/mermaid-cli", None);
        let request = RenderRequest::new(
            "diagrams/flow.mmd",
            "flow.png",
            "mermaid-config.json",
            ScaleArg::Width(900),
        );

        let args = renderer.args(&request).unwrap();
        let input_mount = args[3].to_string_lossy();
        let host_dir = input_mount.trim_end_matches(":/data/input");

        assert!(Path::new(host_dir).is_absolute(), "{host_dir}");
        assert!(host_dir.ends_with("diagrams"), "{host_dir}");
    }

    #[test]
    fn test_docker_is_not_installable() {
        let renderer = DockerRenderer::new("minlag/mermaid-cli", None);
        assert_eq!(renderer.program(), "docker");
        assert!(!renderer.installable());
        assert!(renderer.guidance().contains("docker.com"));
    }
}
