//! Unified error type for iac-scan.

use std::path::PathBuf;
use thiserror::Error;

use super::context::InputKind;
use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::parser::ParseError;
use crate::suppression::SuppressionError;
use crate::types::EngineType;

/// Unified error type for all scan operations.
///
/// Only [`ScanError::Parse`] is ever produced per file; a directory scan
/// turns those into [`crate::types::ParseFailure`] records instead of
/// returning them. Every other variant aborts the pipeline.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Nothing loadable was found under the target path.
    #[error("Could not find any valid infrastructure as code files to scan")]
    NoFilesToScan,

    /// The target path does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An input file could not be read.
    #[error("Failed to read {input} {path}: {source}")]
    Read {
        input: InputKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single file could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// A policy bundle could not be loaded for an engine type.
    #[error("Failed to load {engine} policies: {source}")]
    PolicyLoad {
        engine: EngineType,
        #[source]
        source: EngineError,
    },

    /// Evaluating a document against its policies failed.
    #[error("Failed to evaluate {engine} policies against {path}: {source}")]
    PolicyEvaluation {
        engine: EngineType,
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Suppression policy could not be loaded.
    #[error(transparent)]
    Suppression(#[from] SuppressionError),
}

impl ScanError {
    /// A file under the scan target could not be read.
    pub fn read_target(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            input: InputKind::ScanTarget,
            path: path.into(),
            source,
        }
    }

    /// The variable definitions file could not be read.
    pub fn read_var_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            input: InputKind::VarFile,
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a file.
    pub fn parse_error(path: impl Into<PathBuf>, source: ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the loader found nothing to scan.
    pub fn is_no_files(&self) -> bool {
        matches!(self, Self::NoFilesToScan)
    }

    /// Get the root cause of the error chain.
    pub fn root_cause(&self) -> &dyn std::error::Error {
        let mut current: &dyn std::error::Error = self;
        while let Some(source) = current.source() {
            current = source;
        }
        current
    }
}
