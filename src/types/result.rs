use serde::Serialize;
use std::path::PathBuf;

use super::document::ProjectType;
use super::severity::Severity;
use super::violation::PolicyViolation;

/// A violation ready for reporting and suppression matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedIssue {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub policy: PolicyViolation,
    pub issue_path: Vec<String>,
    /// Source line of the offending field, or `-1` when it could not be resolved.
    pub line_number: i64,
    pub is_ignored: bool,
}

impl FormattedIssue {
    pub fn severity(&self) -> Severity {
        self.policy.severity
    }
}

/// All issues found in one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedResult {
    pub file_path: PathBuf,
    pub project_type: ProjectType,
    pub issues: Vec<FormattedIssue>,
}

impl FormattedResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}
