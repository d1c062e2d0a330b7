//! Configuration file errors.
//!
//! Unlike a missing config file, which falls back to defaults, every variant
//! here aborts the scan.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read iac-scan config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in iac-scan config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid JSON in iac-scan config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in iac-scan config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("iac-scan config {path} has unsupported extension '{extension}' (expected yaml, yml, json or toml)")]
    UnsupportedFormat { path: PathBuf, extension: String },
}
