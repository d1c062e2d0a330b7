use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use super::file::{FileType, SourceFile};
use crate::parser::ParseError;

/// The configuration dialect a parsed document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    Kubernetes,
    Terraform,
    CloudFormation,
    Arm,
    Custom,
}

impl EngineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Terraform => "terraform",
            Self::CloudFormation => "cloudformation",
            Self::Arm => "arm",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Project type reported for a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    K8sConfig,
    TerraformConfig,
    CloudFormationConfig,
    ArmConfig,
    CustomConfig,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::K8sConfig => "k8sconfig",
            Self::TerraformConfig => "terraformconfig",
            Self::CloudFormationConfig => "cloudformationconfig",
            Self::ArmConfig => "armconfig",
            Self::CustomConfig => "customconfig",
        }
    }
}

impl From<EngineType> for ProjectType {
    fn from(engine: EngineType) -> Self {
        match engine {
            EngineType::Kubernetes => Self::K8sConfig,
            EngineType::Terraform => Self::TerraformConfig,
            EngineType::CloudFormation => Self::CloudFormationConfig,
            EngineType::Arm => Self::ArmConfig,
            EngineType::Custom => Self::CustomConfig,
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One canonical document extracted from a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub file_path: PathBuf,
    pub file_type: FileType,
    pub file_content: String,
    pub canonical_content: Value,
    pub engine_type: EngineType,
    pub project_type: ProjectType,
    /// Zero-based position within a multi-document file; `None` for single-document files.
    pub doc_id: Option<usize>,
}

impl ParsedDocument {
    /// Create a single-document result for a source file.
    pub fn new(source: &SourceFile, canonical_content: Value, engine_type: EngineType) -> Self {
        Self {
            file_path: source.file_path.clone(),
            file_type: source.file_type,
            file_content: source.file_content.clone(),
            canonical_content,
            engine_type,
            project_type: engine_type.into(),
            doc_id: None,
        }
    }

    /// Set the document position.
    pub fn with_doc_id(mut self, doc_id: usize) -> Self {
        self.doc_id = Some(doc_id);
        self
    }

    /// Copy of this document routed to another engine, keeping its project type.
    pub fn for_engine(&self, engine_type: EngineType) -> Self {
        Self {
            engine_type,
            ..self.clone()
        }
    }
}

/// A file that could not be turned into any document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailure {
    pub file_path: PathBuf,
    pub file_type: FileType,
    #[serde(skip)]
    pub file_content: String,
    pub failure_reason: String,
    /// `None` for files that failed to parse; the custom engine for rejected
    /// custom rule results.
    pub engine_type: Option<EngineType>,
    #[serde(skip)]
    pub error: ParseError,
}

impl ParseFailure {
    pub fn new(source: &SourceFile, error: ParseError) -> Self {
        Self {
            file_path: source.file_path.clone(),
            file_type: source.file_type,
            file_content: source.file_content.clone(),
            failure_reason: error.to_string(),
            engine_type: None,
            error,
        }
    }

    /// Failure entry for a document that was parsed and evaluated, but whose
    /// results were rejected.
    pub fn for_document(document: &ParsedDocument, error: ParseError) -> Self {
        Self {
            file_path: document.file_path.clone(),
            file_type: document.file_type,
            file_content: document.file_content.clone(),
            failure_reason: error.to_string(),
            engine_type: Some(document.engine_type),
            error,
        }
    }
}

/// Parsed documents and per-file failures of one parsing pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsingResults {
    pub parsed: Vec<ParsedDocument>,
    pub failed: Vec<ParseFailure>,
}

impl ParsingResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another pass's results, keeping order.
    pub fn merge(mut self, other: ParsingResults) -> Self {
        self.parsed.extend(other.parsed);
        self.failed.extend(other.failed);
        self
    }
}
