//! Azure Resource Manager template detection.

use serde_json::Value;

use crate::types::{EngineType, ParsedDocument, SourceFile};

/// Whether a JSON document is an ARM deployment template.
pub fn is_arm_template(document: &Value) -> bool {
    document
        .get("$schema")
        .and_then(Value::as_str)
        .is_some_and(|schema| schema.to_lowercase().contains("deploymenttemplate"))
}

/// The template is scanned unchanged.
pub fn parse_arm(source: &SourceFile, document: Value) -> Vec<ParsedDocument> {
    vec![ParsedDocument::new(source, document, EngineType::Arm)]
}
