use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{InlineError, Result};
use crate::fs::SourceFs;

/// Default ceiling on nested inclusion depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Settings for a flattening run.
///
/// Can be loaded from a JSON file; missing fields take their defaults.
///
/// ```
/// use texflat_core::config::InlinerConfig;
///
/// let config: InlinerConfig = serde_json::from_str(r#"{ "max_depth": 3 }"#).unwrap();
/// assert_eq!(config.max_depth, 3);
/// assert_eq!(config.extension, "tex");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlinerConfig {
    /// Nesting level beyond which inclusions are left unexpanded.
    pub max_depth: usize,
    /// Suffix appended to directive arguments that lack it (without the dot).
    pub extension: String,
    /// Suffix used to derive the default output path (without the dot).
    pub output_suffix: String,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            extension: "tex".to_string(),
            output_suffix: "inline.tex".to_string(),
        }
    }
}

impl InlinerConfig {
    /// Loads a JSON configuration file.
    pub fn load(fs: &dyn SourceFs, path: &Path) -> Result<Self> {
        let text = fs.read_source(path).map_err(|source| InlineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| InlineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `main.tex` becomes `main.inline.tex` with the default suffix.
    pub fn default_output_path(&self, main: &Path) -> PathBuf {
        main.with_extension(&self.output_suffix)
    }

    /// Appends `.<extension>` to `argument` unless it already ends with it.
    pub fn with_extension(&self, argument: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if argument.ends_with(&suffix) {
            argument.to_string()
        } else {
            format!("{argument}{suffix}")
        }
    }
}
