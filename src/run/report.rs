//! Final scan report.

use serde::Serialize;

use crate::parser::ParseError;
use crate::types::{FormattedResult, ParseFailure};

/// Process exit code when no issue remains.
pub const EXIT_OK: u8 = 0;
/// Process exit code when issues remain after filtering.
pub const EXIT_ISSUES: u8 = 1;
/// Process exit code for fatal errors.
pub const EXIT_ERROR: u8 = 2;
/// Process exit code when nothing could be scanned.
pub const EXIT_NO_FILES: u8 = 3;

/// Everything one scan produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub results: Vec<FormattedResult>,
    /// Files that could not be parsed in a directory scan, plus rejected
    /// custom rule results.
    pub failures: Vec<ParseFailure>,
    /// Issues removed by the suppression policy.
    pub ignore_count: usize,
}

impl ScanReport {
    pub fn issue_count(&self) -> usize {
        self.results.iter().map(|r| r.issues.len()).sum()
    }

    pub fn has_issues(&self) -> bool {
        self.results.iter().any(FormattedResult::has_issues)
    }

    /// Whether a custom rule bundle produced results that had to be rejected.
    pub fn has_rejected_custom_results(&self) -> bool {
        self.failures
            .iter()
            .any(|f| matches!(f.error, ParseError::InvalidCustomRule { .. }))
    }

    /// A broken custom rule bundle is an error even when issues were found.
    pub fn exit_code(&self) -> u8 {
        if self.has_rejected_custom_results() {
            EXIT_ERROR
        } else if self.has_issues() {
            EXIT_ISSUES
        } else {
            EXIT_OK
        }
    }
}
