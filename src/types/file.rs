use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension-derived tag of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Tf,
    Tfvars,
    Json,
    Yaml,
    Yml,
}

impl FileType {
    /// All extensions the loader picks up.
    pub const EXTENSIONS: [&'static str; 5] = ["tf", "tfvars", "json", "yaml", "yml"];

    /// Detect file type from an extension without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "tf" => Some(Self::Tf),
            "tfvars" => Some(Self::Tfvars),
            "json" => Some(Self::Json),
            "yaml" => Some(Self::Yaml),
            "yml" => Some(Self::Yml),
            _ => None,
        }
    }

    /// Detect file type from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tf => "tf",
            Self::Tfvars => "tfvars",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Yml => "yml",
        }
    }

    /// Terraform sources share one variable context per directory.
    pub fn is_terraform(&self) -> bool {
        matches!(self, Self::Tf | Self::Tfvars)
    }

    pub fn is_yaml(&self) -> bool {
        matches!(self, Self::Yaml | Self::Yml)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A configuration file read from disk, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_path: PathBuf,
    pub file_type: FileType,
    pub file_content: String,
}

impl SourceFile {
    pub fn new(
        file_path: impl Into<PathBuf>,
        file_type: FileType,
        file_content: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            file_type,
            file_content: file_content.into(),
        }
    }
}
