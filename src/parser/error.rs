//! Per-file parse errors.

use thiserror::Error;

use crate::error::ParseFormat;

/// Why a single source file produced no documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid {format}: {message}")]
    Syntax { format: ParseFormat, message: String },

    #[error(
        "Helm templates are not supported; render the chart with `helm template` and scan the output"
    )]
    HelmTemplating,

    #[error(
        "no Kubernetes or CloudFormation document found in {0} file (Kubernetes requires apiVersion, kind and metadata; CloudFormation requires Resources)"
    )]
    NoRecognizedDocuments(ParseFormat),

    #[error("failed to extract resources from Terraform plan: {0}")]
    InvalidTerraformPlan(String),

    #[error("unsupported file extension: {0}")]
    UnsupportedFileType(String),

    #[error("failed to read file: {0}")]
    Unreadable(String),

    /// A custom rule reported a result that cannot be shown as an issue.
    #[error("Invalid custom rule {id}: {reason}")]
    InvalidCustomRule { id: String, reason: String },
}

impl ParseError {
    pub fn syntax(format: ParseFormat, err: impl std::fmt::Display) -> Self {
        Self::Syntax {
            format,
            message: err.to_string(),
        }
    }
}
