//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Project root discovery
    #[serde(default)]
    pub project: ProjectConfig,

    /// Data file recognition
    #[serde(default)]
    pub files: FilesConfig,

    /// Result comparison settings
    #[serde(default)]
    pub compare: CompareConfig,
}

/// Project root discovery settings
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Files whose presence marks a directory as the project root
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
        }
    }
}

fn default_markers() -> Vec<String> {
    vec!["Cargo.toml".to_string()]
}

/// Suffixes that mark a string argument as a reference to a data file
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Files whose whole content is structured (JSON) text
    #[serde(default = "default_structured_suffixes")]
    pub structured_suffixes: Vec<String>,

    /// Files read as one value per line
    #[serde(default = "default_line_suffixes")]
    pub line_suffixes: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            structured_suffixes: default_structured_suffixes(),
            line_suffixes: default_line_suffixes(),
        }
    }
}

fn default_structured_suffixes() -> Vec<String> {
    vec![".json".to_string()]
}
fn default_line_suffixes() -> Vec<String> {
    vec![".txt".to_string()]
}

/// Comparison settings
#[derive(Debug, Deserialize, Clone)]
pub struct CompareConfig {
    /// Absolute tolerance for numeric comparison; 0 means exact
    #[serde(default)]
    pub tolerance: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self { tolerance: 0.0 }
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, &e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        if config.compare.tolerance < 0.0 || !config.compare.tolerance.is_finite() {
            return Err(super::Error::Config(format!(
                "compare.tolerance must be a finite non-negative number, got {}",
                config.compare.tolerance
            )));
        }
        Ok(config)
    }
}
