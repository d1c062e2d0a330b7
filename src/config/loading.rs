//! Configuration loading functions.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ConfigError;
use super::types::Config;

/// Project-level config file names, in search order.
pub const PROJECT_CONFIG_FILES: [&str; 4] = [
    ".iac-scan.yaml",
    ".iac-scan.yml",
    ".iac-scan.json",
    ".iac-scan.toml",
];

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" if content.trim().is_empty() => Ok(Self::default()),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
            "json" => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            "toml" => toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// The config file that `load` would read, if any.
    ///
    /// Search order:
    /// 1. `.iac-scan.yaml`, `.iac-scan.yml`, `.iac-scan.json`, `.iac-scan.toml`
    ///    in the project root
    /// 2. `~/.config/iac-scan/config.yaml`
    pub fn locate(project_root: Option<&Path>) -> Option<PathBuf> {
        let project = project_root.into_iter().flat_map(|root| {
            PROJECT_CONFIG_FILES
                .iter()
                .map(move |filename| root.join(filename))
        });
        let global = dirs::config_dir().map(|dir| dir.join("iac-scan").join("config.yaml"));

        project.chain(global).find(|path| path.is_file())
    }

    /// Load configuration from the project directory or global config,
    /// falling back to defaults when neither exists.
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::locate(project_root) {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}
