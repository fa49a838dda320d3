//! Browser-viewable fallback for diagrams the renderer could not convert.
//!
//! The page embeds the raw diagram source and loads Mermaid's client-side
//! renderer, so the operator can open it and capture a screenshot by hand.
//! Producing it does not make the job successful.

use std::{fs, io, path::Path};

use log::debug;

/// Client-side Mermaid library referenced by fallback pages.
pub const MERMAID_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

/// Builds a self-contained HTML page rendering `source` in the browser.
///
/// # Arguments
///
/// * `title` - Page title, usually the diagram's file stem
/// * `source` - Raw Mermaid source
/// * `theme` - Mermaid theme name used by the client-side renderer
pub fn render_html(title: &str, source: &str, theme: &str) -> String {
    let title = escape_html(title);
    let source = escape_html(source.trim_end());
    // A JSON string literal is a valid JavaScript string literal.
    let theme = serde_json::Value::from(theme).to_string();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="{MERMAID_SCRIPT_URL}"></script>
  <script>mermaid.initialize({{ startOnLoad: true, theme: {theme} }});</script>
  <style>body {{ background: #1e1e1e; margin: 2em; }}</style>
</head>
<body>
  <div class="mermaid">
{source}
  </div>
</body>
</html>
"#
    )
}

/// Reads `source_path` and writes its fallback page to `html_path`.
///
/// # Errors
///
/// Returns an I/O error if the source cannot be read or the page cannot be
/// written.
pub fn write_fallback(source_path: &Path, html_path: &Path, theme: &str) -> io::Result<()> {
    let source = fs::read_to_string(source_path)?;
    let title = html_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    fs::write(html_path, render_html(&title, &source, theme))?;
    debug!(path = html_path.display().to_string(); "Fallback page written");
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_source_is_escaped() {
        let html = render_html("flow", "graph TD\n  A-->B & C<br>", "dark");

        assert!(html.contains("A--&gt;B &amp; C&lt;br&gt;"), "{html}");
        assert!(!html.contains("C<br>"));
    }

    #[test]
    fn test_page_loads_client_renderer() {
        let html = render_html("flow", "graph TD; A-->B", "forest");

        assert!(html.contains(MERMAID_SCRIPT_URL));
        assert!(html.contains(r#"theme: "forest""#));
        assert!(html.contains(r#"<div class="mermaid">"#));
        assert!(html.contains("<title>flow</title>"));
    }

    #[test]
    fn test_write_fallback_names_page_after_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("seq.mmd");
        let html = dir.path().join("seq.html");
        fs::write(&source, "sequenceDiagram\n  Alice->>Bob: Hi").unwrap();

        write_fallback(&source, &html, "dark").unwrap();

        let page = fs::read_to_string(&html).unwrap();
        assert!(page.contains("Alice-&gt;&gt;Bob: Hi"));
        assert!(page.contains("<title>seq</title>"));
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = tempdir().unwrap();
        assert!(
            write_fallback(&dir.path().join("gone.mmd"), &dir.path().join("gone.html"), "dark")
                .is_err()
        );
    }
}
