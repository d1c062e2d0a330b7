//! Parser traits for the format parsing layer.

use super::error::ParseError;
use super::plan::PlanScanMode;
use super::variables::VarsContext;
use crate::types::{FileType, ParsedDocument, SourceFile};

/// Directory-level state a parser may need.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub plan_scan_mode: PlanScanMode,
    /// Present when Terraform references should be resolved.
    pub variables: Option<VarsContext>,
}

impl ParseContext {
    pub fn new(plan_scan_mode: PlanScanMode) -> Self {
        Self {
            plan_scan_mode,
            variables: None,
        }
    }

    pub fn with_variables(mut self, variables: VarsContext) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Trait for format-specific parsers.
pub trait ContentParser: Send + Sync {
    /// Turn one source file into its canonical documents.
    fn parse(
        &self,
        source: &SourceFile,
        context: &ParseContext,
    ) -> Result<Vec<ParsedDocument>, ParseError>;

    /// File types this parser handles.
    fn supported_file_types(&self) -> &[FileType];

    /// Check if this parser can handle the given file type.
    fn can_parse(&self, file_type: FileType) -> bool {
        self.supported_file_types().contains(&file_type)
    }
}
