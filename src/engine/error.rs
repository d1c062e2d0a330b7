//! Policy bundle and evaluation errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("policy bundle not found at {0}; place the rule bundle there or pass --rules-dir")]
    MissingArtifact(PathBuf),

    #[error("failed to read policy bundle {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt policy bundle {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid rule {id}: {reason}")]
    InvalidRule { id: String, reason: String },

    #[error("{0}")]
    Evaluation(String),
}

impl EngineError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_names_location() {
        let err = EngineError::MissingArtifact(PathBuf::from("/cache/iac-scan/rules/k8s_policy.json"));
        assert!(err.to_string().contains("/cache/iac-scan/rules/k8s_policy.json"));
    }

    #[test]
    fn test_malformed_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = EngineError::malformed("tf_policy.json", source);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("corrupt policy bundle tf_policy.json"));
    }
}
