//! Analyzer configuration.
//!
//! Configuration is read from a JSON file, either given explicitly or
//! found as `patternscope.json` in the analyzed root. Every field has a
//! default, so an empty object (or no file at all) is a valid config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// File name looked up in the project root when no config path is given.
pub const CONFIG_FILE_NAME: &str = "patternscope.json";

/// Directories skipped during traversal unless the config says otherwise.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "coverage",
    ".turbo",
];

/// Errors that can occur while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the file from disk.
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse config: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for a project analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Directory names skipped during traversal.
    pub ignored_dirs: Vec<String>,
    /// Keep records tagged `@ignore` in the report.
    pub include_ignored: bool,
    /// Restrict analysis to these file extensions; empty means every
    /// supported extension.
    pub extensions: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            include_ignored: false,
            extensions: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse a configuration from a JSON string.
    pub fn parse_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a configuration file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Load the configuration for a project.
    ///
    /// An explicit path must exist. Without one, `<root>/patternscope.json`
    /// is used when present and defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            log::debug!("loading config from {}", path.display());
            return Self::from_file(path);
        }

        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("loading config from {}", candidate.display());
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns true if a directory with this name is skipped.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }

    /// Returns true if files with this extension are analyzed.
    ///
    /// Only consulted for extensions the parser already supports.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.is_empty()
            || self
                .extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
