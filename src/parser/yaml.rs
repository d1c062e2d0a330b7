//! Kubernetes and CloudFormation document detection for YAML files.

use serde_json::Value;
use tracing::trace;

use super::error::ParseError;
use super::traits::{ContentParser, ParseContext};
use super::yaml_value::parse_documents;
use crate::error::ParseFormat;
use crate::types::{EngineType, FileType, ParsedDocument, SourceFile};

pub const REQUIRED_K8S_FIELDS: [&str; 3] = ["apiVersion", "kind", "metadata"];
pub const REQUIRED_CLOUDFORMATION_FIELDS: [&str; 1] = ["Resources"];

/// Helm templates put `{{ ... }}` expressions on a single line.
pub fn contains_helm_templating(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.contains("{{") && line.contains("}}"))
}

fn has_fields(document: &Value, fields: &[&str]) -> bool {
    document
        .as_object()
        .is_some_and(|map| fields.iter().all(|f| map.contains_key(*f)))
}

/// Engine type of a document by required-field presence, CloudFormation first.
pub fn detect_engine_type(document: &Value) -> Option<EngineType> {
    if has_fields(document, &REQUIRED_CLOUDFORMATION_FIELDS) {
        Some(EngineType::CloudFormation)
    } else if has_fields(document, &REQUIRED_K8S_FIELDS) {
        Some(EngineType::Kubernetes)
    } else {
        None
    }
}

/// Keep the recognized documents of a stream, tagging each with its position.
///
/// Empty and unrecognized documents are dropped without shifting the
/// positions of the others. A stream with nothing recognized is an error.
pub fn detect_config_type(
    source: &SourceFile,
    documents: Vec<Value>,
    format: ParseFormat,
) -> Result<Vec<ParsedDocument>, ParseError> {
    if contains_helm_templating(&source.file_content) {
        return Err(ParseError::HelmTemplating);
    }

    let parsed: Vec<ParsedDocument> = documents
        .into_iter()
        .enumerate()
        .filter_map(|(doc_id, document)| {
            if document.is_null() {
                trace!(path = %source.file_path.display(), doc_id, "Dropping empty document");
                return None;
            }
            let Some(engine_type) = detect_engine_type(&document) else {
                trace!(path = %source.file_path.display(), doc_id, "Dropping unrecognized document");
                return None;
            };
            Some(ParsedDocument::new(source, document, engine_type).with_doc_id(doc_id))
        })
        .collect();

    if parsed.is_empty() {
        return Err(ParseError::NoRecognizedDocuments(format));
    }
    Ok(parsed)
}

/// Parser for YAML files holding Kubernetes manifests or CloudFormation templates.
pub struct YamlParser;

impl YamlParser {
    /// Create a new YAML parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentParser for YamlParser {
    fn parse(
        &self,
        source: &SourceFile,
        _context: &ParseContext,
    ) -> Result<Vec<ParsedDocument>, ParseError> {
        if contains_helm_templating(&source.file_content) {
            return Err(ParseError::HelmTemplating);
        }
        let documents = parse_documents(&source.file_content)
            .map_err(|e| ParseError::syntax(ParseFormat::Yaml, e))?;
        detect_config_type(source, documents, ParseFormat::Yaml)
    }

    fn supported_file_types(&self) -> &[FileType] {
        &[FileType::Yaml, FileType::Yml]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Vec<ParsedDocument>, ParseError> {
        let source = SourceFile::new("app.yaml", FileType::Yaml, content);
        YamlParser::new().parse(&source, &ParseContext::default())
    }

    const POD: &str = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\nspec:\n  containers:\n    - name: web\n      image: nginx\n";

    #[test]
    fn test_parse_kubernetes_pod() {
        let docs = parse(POD).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].engine_type, EngineType::Kubernetes);
        assert_eq!(docs[0].doc_id, Some(0));
        assert_eq!(docs[0].canonical_content["spec"]["containers"][0]["image"], "nginx");
    }

    #[test]
    fn test_parse_cloudformation() {
        let docs = parse("AWSTemplateFormatVersion: '2010-09-09'\nResources:\n  Bucket:\n    Type: AWS::S3::Bucket\n").unwrap();
        assert_eq!(docs[0].engine_type, EngineType::CloudFormation);
    }

    #[test]
    fn test_cloudformation_wins_over_kubernetes() {
        let docs = parse("apiVersion: v1\nkind: Pod\nmetadata: {}\nResources: {}\n").unwrap();
        assert_eq!(docs[0].engine_type, EngineType::CloudFormation);
    }

    #[test]
    fn test_unrecognized_document_is_dropped() {
        let content = format!("{POD}---\napiVersion: v1\nmetadata:\n  name: no-kind\n");
        let docs = parse(&content).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].doc_id, Some(0));
    }

    #[test]
    fn test_doc_ids_keep_original_positions() {
        let content = format!("foo: bar\n---\n{POD}---\n---\n{POD}");
        let docs = parse(&content).unwrap();
        let ids: Vec<Option<usize>> = docs.iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);
    }

    #[test]
    fn test_leading_separator_opens_first_document() {
        let content = format!("---\n{POD}---\n{POD}");
        let docs = parse(&content).unwrap();
        let ids: Vec<Option<usize>> = docs.iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_trailing_separator() {
        let content = format!("{POD}---\n");
        let docs = parse(&content).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_no_recognized_documents() {
        let err = parse("foo: bar\n").unwrap_err();
        assert_eq!(err, ParseError::NoRecognizedDocuments(ParseFormat::Yaml));
    }

    #[test]
    fn test_helm_template_rejected() {
        let err = parse("apiVersion: v1\nkind: Pod\nmetadata:\n  name: {{ .Values.name }}\n").unwrap_err();
        assert_eq!(err, ParseError::HelmTemplating);
    }

    #[test]
    fn test_braces_on_separate_lines_are_not_helm() {
        let docs = parse("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm\ndata:\n  a: \"{{\"\n  b: \"}}\"\n").unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse("apiVersion: v1\nkind: [Pod\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { format: ParseFormat::Yaml, .. }));
    }
}
