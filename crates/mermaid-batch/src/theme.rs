//! Theme configuration handed to the renderer.
//!
//! The renderer reads its theme from a JSON file passed by path (`-c`). The
//! document has a fixed shape:
//!
//! ```json
//! {
//!   "theme": "dark",
//!   "themeVariables": { "primaryColor": "#6e54bc", "...": "..." }
//! }
//! ```
//!
//! A [`ThemeConfig`] is computed once per run and written once, before the
//! first diagram is converted.

use std::{fs, path::Path, str::FromStr};

use color::DynamicColor;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// The built-in dark palette, in the order it is written to disk.
const DARK_PALETTE: [(&str, &str); 6] = [
    ("primaryColor", "#6e54bc"),
    ("primaryTextColor", "#fff"),
    ("primaryBorderColor", "#8a78d0"),
    ("lineColor", "#a0a0a0"),
    ("secondaryColor", "#355c7d"),
    ("tertiaryColor", "#2a4365"),
];

/// Theme name plus colour variables understood by Mermaid.
///
/// A `[theme.variables]` table in the configuration file replaces the
/// default palette as a whole; keys are not merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Mermaid theme name (`dark`, `default`, `forest`, `neutral`, ...).
    name: String,

    /// Mermaid `themeVariables`, colour key to CSS colour string.
    variables: IndexMap<String, String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "dark".to_string(),
            variables: DARK_PALETTE
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        }
    }
}

/// On-disk shape expected by the renderer.
#[derive(Serialize)]
struct RendererTheme<'a> {
    theme: &'a str,
    #[serde(rename = "themeVariables")]
    theme_variables: &'a IndexMap<String, String>,
}

impl ThemeConfig {
    /// Creates a theme from a name and an ordered set of colour variables.
    pub fn new(name: impl Into<String>, variables: IndexMap<String, String>) -> Self {
        Self {
            name: name.into(),
            variables,
        }
    }

    /// Returns the Mermaid theme name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the colour variables in write order.
    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.variables
    }

    /// Checks that every variable holds a parseable CSS colour.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Config`] naming the first offending variable.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.name.trim().is_empty() {
            return Err(BatchError::Config("theme name must not be empty".to_string()));
        }

        for (key, value) in &self.variables {
            DynamicColor::from_str(value).map_err(|err| {
                BatchError::Config(format!("invalid color `{value}` for theme variable `{key}`: {err}"))
            })?;
        }

        Ok(())
    }

    /// Serializes the theme into the renderer's JSON document.
    ///
    /// The output is pretty-printed and newline terminated, and is identical
    /// for identical themes.
    pub fn to_json(&self) -> Result<String, BatchError> {
        let document = RendererTheme {
            theme: &self.name,
            theme_variables: &self.variables,
        };
        let mut json = serde_json::to_string_pretty(&document)?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the renderer JSON document to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), BatchError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!(path = path.display().to_string(); "Renderer configuration written");
        Ok(())
    }
}
