//! Discovery of diagram sources in an input directory.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::trace;

/// Extension identifying Mermaid diagram sources.
pub const SOURCE_EXTENSION: &str = "mmd";

/// Lists the diagram sources directly inside `dir`.
///
/// Only regular files with the exact [`SOURCE_EXTENSION`] are returned;
/// subdirectories are not searched. The result is sorted by path so that
/// runs over the same directory process files in the same order.
///
/// # Errors
///
/// Returns an I/O error if `dir` cannot be read.
pub fn find_sources(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
        {
            trace!(path = path.display().to_string(); "Found diagram source");
            sources.push(path);
        }
    }

    sources.sort();
    Ok(sources)
}

/// Returns the file stem used to name a source's outputs.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
