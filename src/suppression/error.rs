//! Suppression policy errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SuppressionError {
    #[error("Failed to read suppression policy {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse suppression policy {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid suppression policy: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid {field} date '{value}' in suppression rule for {id}")]
    InvalidDate {
        id: String,
        field: &'static str,
        value: String,
    },
}
