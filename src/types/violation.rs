use serde::{Deserialize, Serialize};

use super::document::ParsedDocument;
use super::severity::Severity;

/// A policy that a document violated, as reported by an evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolation {
    pub public_id: String,
    #[serde(rename = "type", default)]
    pub policy_type: String,
    #[serde(default)]
    pub sub_type: String,
    pub title: String,
    pub severity: Severity,
    /// Dot-separated path into the canonical document naming the offending field.
    #[serde(rename = "msg", alias = "message")]
    pub message: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub resolve: String,
    #[serde(default)]
    pub references: Vec<String>,
    /// Position of the owning document, carried through result grouping.
    #[serde(skip)]
    pub doc_id: Option<usize>,
}

impl PolicyViolation {
    pub fn new(
        public_id: impl Into<String>,
        title: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            public_id: public_id.into(),
            policy_type: String::new(),
            sub_type: String::new(),
            title: title.into(),
            severity,
            message: message.into(),
            issue: String::new(),
            impact: String::new(),
            resolve: String::new(),
            references: Vec::new(),
            doc_id: None,
        }
    }
}

/// A parsed document together with the policies it violated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub document: ParsedDocument,
    pub violated_policies: Vec<PolicyViolation>,
}

impl ScanResult {
    pub fn new(document: ParsedDocument, violated_policies: Vec<PolicyViolation>) -> Self {
        Self {
            document,
            violated_policies,
        }
    }
}
