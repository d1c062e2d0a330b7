//! JSON parser routing plans, ARM templates and Kubernetes/CloudFormation documents.

use serde_json::Value;
use tracing::debug;

use super::arm::{is_arm_template, parse_arm};
use super::error::ParseError;
use super::plan::{is_terraform_plan, parse_plan};
use super::traits::{ContentParser, ParseContext};
use super::yaml::detect_config_type;
use super::yaml_value::parse_documents;
use crate::error::ParseFormat;
use crate::types::{FileType, ParsedDocument, SourceFile};

/// Parser for `.json` files.
pub struct JsonParser;

impl JsonParser {
    /// Create a new JSON parser.
    pub fn new() -> Self {
        Self
    }

    /// Decode strict JSON, falling back to a YAML stream for concatenated
    /// documents and other relaxed input.
    pub fn parse_documents(content: &str) -> Result<Vec<Value>, ParseError> {
        match serde_json::from_str::<Value>(content) {
            Ok(value) => Ok(vec![value]),
            Err(json_err) => parse_documents(content).map_err(|yaml_err| {
                debug!(error = %yaml_err, "YAML fallback failed for JSON file");
                ParseError::syntax(ParseFormat::Json, json_err)
            }),
        }
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentParser for JsonParser {
    fn parse(
        &self,
        source: &SourceFile,
        context: &ParseContext,
    ) -> Result<Vec<ParsedDocument>, ParseError> {
        let documents = Self::parse_documents(&source.file_content)?;

        // a plan or an ARM template is always a single document
        if let [document] = documents.as_slice() {
            if is_terraform_plan(document) {
                debug!(path = %source.file_path.display(), mode = %context.plan_scan_mode, "Detected Terraform plan");
                return parse_plan(source, document, context.plan_scan_mode);
            }
            if is_arm_template(document) {
                debug!(path = %source.file_path.display(), "Detected ARM template");
                return Ok(parse_arm(source, document.clone()));
            }
        }

        detect_config_type(source, documents, ParseFormat::Json)
    }

    fn supported_file_types(&self) -> &[FileType] {
        &[FileType::Json]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PlanScanMode;
    use crate::types::EngineType;

    fn parse(content: &str) -> Result<Vec<ParsedDocument>, ParseError> {
        let source = SourceFile::new("input.json", FileType::Json, content);
        JsonParser::new().parse(&source, &ParseContext::new(PlanScanMode::Delta))
    }

    #[test]
    fn test_parse_kubernetes_json() {
        let docs = parse(r#"{"apiVersion": "v1", "kind": "Service", "metadata": {"name": "api"}}"#).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].engine_type, EngineType::Kubernetes);
        assert_eq!(docs[0].doc_id, Some(0));
    }

    #[test]
    fn test_parse_cloudformation_json() {
        let docs = parse(r#"{"Resources": {"Queue": {"Type": "AWS::SQS::Queue"}}}"#).unwrap();
        assert_eq!(docs[0].engine_type, EngineType::CloudFormation);
    }

    #[test]
    fn test_parse_terraform_plan() {
        let plan = r#"{
            "planned_values": {"root_module": {"resources": []}},
            "resource_changes": [
                {"mode": "managed", "type": "aws_vpc", "name": "main", "change": {"actions": ["create"], "after": {"cidr_block": "10.0.0.0/16"}}}
            ]
        }"#;
        let docs = parse(plan).unwrap();
        assert_eq!(docs[0].engine_type, EngineType::Terraform);
        assert_eq!(docs[0].doc_id, None);
        assert_eq!(
            docs[0].canonical_content["resource"]["aws_vpc"]["main"]["cidr_block"],
            "10.0.0.0/16"
        );
    }

    #[test]
    fn test_parse_arm_template() {
        let arm = r#"{"$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#", "resources": []}"#;
        let docs = parse(arm).unwrap();
        assert_eq!(docs[0].engine_type, EngineType::Arm);
    }

    #[test]
    fn test_document_stream_falls_back_to_yaml() {
        let stream = "---\n{\"apiVersion\": \"v1\", \"kind\": \"Pod\", \"metadata\": {\"name\": \"a\"}}\n---\n{\"apiVersion\": \"v1\", \"kind\": \"Service\", \"metadata\": {\"name\": \"b\"}}\n";
        let docs = parse(stream).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].doc_id, Some(0));
        assert_eq!(docs[1].doc_id, Some(1));
        assert_eq!(docs[1].canonical_content["kind"], "Service");
        assert!(docs.iter().all(|d| d.engine_type == EngineType::Kubernetes));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let docs = parse(r#"{"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "a"}, "metadata": {"name": "b"}}"#).unwrap();
        assert_eq!(docs[0].canonical_content["metadata"]["name"], "b");
    }

    #[test]
    fn test_unrecognized_json() {
        let err = parse(r#"{"name": "package", "version": "1.0.0"}"#).unwrap_err();
        assert_eq!(err, ParseError::NoRecognizedDocuments(ParseFormat::Json));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse(r#"{"apiVersion": "v1", "kind": [}"#).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { format: ParseFormat::Json, .. }));
    }
}
