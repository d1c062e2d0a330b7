//! Terraform HCL parser.

use serde_json::{Map, Value};

use super::error::ParseError;
use super::traits::{ContentParser, ParseContext};
use crate::error::ParseFormat;
use crate::types::{EngineType, FileType, ParsedDocument, SourceFile};

/// Decode an HCL body into a tree grouped by top-level block type.
///
/// Labelled blocks nest one object level per label; expressions that are not
/// literals keep their source form as `${...}` strings. Blank input is an
/// empty body.
pub fn parse_hcl(content: &str) -> Result<Value, ParseError> {
    if content.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    hcl::from_str::<Value>(content).map_err(|e| ParseError::syntax(ParseFormat::Hcl, e))
}

/// Parser for `.tf` files.
pub struct TerraformParser;

impl TerraformParser {
    /// Create a new Terraform parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerraformParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentParser for TerraformParser {
    fn parse(
        &self,
        source: &SourceFile,
        context: &ParseContext,
    ) -> Result<Vec<ParsedDocument>, ParseError> {
        let mut body = parse_hcl(&source.file_content)?;
        if let Some(variables) = &context.variables {
            variables.dereference(&mut body);
        }
        Ok(vec![ParsedDocument::new(source, body, EngineType::Terraform)])
    }

    fn supported_file_types(&self) -> &[FileType] {
        &[FileType::Tf]
    }
}
