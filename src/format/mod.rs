//! Results formatter.
//!
//! Groups scan results per source file, derives issue paths, resolves line
//! numbers and applies the severity threshold.

pub mod line_number;

pub use line_number::{
    DOC_ID_PREFIX, IndentationResolver, LineNumberError, LineNumberFileType, LineNumberResolver,
    doc_id_marker,
};

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, trace};

use crate::types::{
    FileType, FormattedIssue, FormattedResult, PolicyViolation, ProjectType, ScanResult, Severity,
};

/// Split a violation message into path segments.
///
/// Dots inside `[...]` belong to the segment, so
/// `metadata.annotations[a.b/c].x` has three segments.
pub fn parse_path(message: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in message.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '.' if depth == 0 => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Issue path of a violation, prefixed with its document marker when the
/// owning document came from a multi-document file.
pub fn issue_path(violation: &PolicyViolation) -> Vec<String> {
    let segments = parse_path(&violation.message);
    match violation.doc_id {
        Some(doc_id) => std::iter::once(format!("{DOC_ID_PREFIX}{doc_id}]"))
            .chain(segments)
            .collect(),
        None => segments,
    }
}

/// Violations of every document of one file.
#[derive(Debug)]
struct FileGroup {
    file_path: PathBuf,
    file_type: FileType,
    file_content: String,
    project_type: ProjectType,
    violations: Vec<PolicyViolation>,
}

#[derive(Debug, Default)]
struct Groups {
    files: Vec<FileGroup>,
    index: HashMap<PathBuf, usize>,
}

impl Groups {
    fn add(mut self, result: ScanResult) -> Self {
        let ScanResult {
            document,
            violated_policies,
        } = result;
        let doc_id = document.doc_id;
        let violations = violated_policies.into_iter().map(move |mut violation| {
            violation.doc_id = doc_id;
            violation
        });

        match self.index.get(&document.file_path) {
            Some(&i) => self.files[i].violations.extend(violations),
            None => {
                self.index.insert(document.file_path.clone(), self.files.len());
                self.files.push(FileGroup {
                    violations: violations.collect(),
                    file_path: document.file_path,
                    file_type: document.file_type,
                    file_content: document.file_content,
                    project_type: document.project_type,
                });
            }
        }
        self
    }
}

/// Turns scan results into one formatted result per source file.
pub struct ResultsFormatter<'a> {
    severity_threshold: Option<Severity>,
    resolver: &'a dyn LineNumberResolver,
}

impl<'a> ResultsFormatter<'a> {
    pub fn new(resolver: &'a dyn LineNumberResolver) -> Self {
        Self {
            severity_threshold: None,
            resolver,
        }
    }

    pub fn with_severity_threshold(mut self, threshold: Option<Severity>) -> Self {
        self.severity_threshold = threshold;
        self
    }

    /// Results come out in first-seen file order, issues in evaluation order.
    pub fn format(&self, results: Vec<ScanResult>) -> Vec<FormattedResult> {
        let groups = results.into_iter().fold(Groups::default(), Groups::add);
        groups
            .files
            .into_iter()
            .map(|group| self.format_group(group))
            .collect()
    }

    fn format_group(&self, group: FileGroup) -> FormattedResult {
        let line_type = LineNumberFileType::try_from(group.file_type);
        let issues = group
            .violations
            .into_iter()
            .filter(|violation| violation.severity.passes(self.severity_threshold))
            .map(|violation| {
                let issue_path = issue_path(&violation);
                let line_number = line_type
                    .clone()
                    .and_then(|file_type| {
                        self.resolver
                            .resolve(&group.file_content, file_type, &issue_path)
                    })
                    .unwrap_or_else(|err| {
                        debug!(path = %group.file_path.display(), error = %err, "Line number unavailable");
                        -1
                    });
                trace!(rule = %violation.public_id, line = line_number, "Formatted issue");
                FormattedIssue {
                    id: violation.public_id.clone(),
                    name: violation.title.clone(),
                    policy: violation,
                    issue_path,
                    line_number,
                    is_ignored: false,
                }
            })
            .collect();

        FormattedResult {
            file_path: group.file_path,
            project_type: group.project_type,
            issues,
        }
    }
}

/// Format with the default line number resolver.
pub fn format_results(
    results: Vec<ScanResult>,
    severity_threshold: Option<Severity>,
) -> Vec<FormattedResult> {
    let resolver = IndentationResolver::new();
    ResultsFormatter::new(&resolver)
        .with_severity_threshold(severity_threshold)
        .format(results)
}
