//! Ignore-policy filter.
//!
//! Removes formatted issues covered by a user suppression policy. Each issue
//! is matched on the key `[filePath, ...issuePath]`.

pub mod error;
pub mod policy;

pub use error::SuppressionError;
pub use policy::{PATH_SEPARATOR, RulePath, SuppressionPolicy, SuppressionRule, WILDCARD};

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

use crate::types::{FormattedIssue, FormattedResult};

/// Filtered results and the number of issues removed.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub filtered: Vec<FormattedResult>,
    pub ignore_count: usize,
}

/// Suppression key of an issue.
pub fn match_key(file_path: &Path, issue: &FormattedIssue) -> Vec<String> {
    std::iter::once(file_path.to_string_lossy().into_owned())
        .chain(issue.issue_path.iter().cloned())
        .collect()
}

/// Apply a suppression policy at the current time.
pub fn filter_ignored(
    policy: Option<&SuppressionPolicy>,
    results: &[FormattedResult],
) -> FilterOutcome {
    filter_ignored_at(policy, results, Utc::now())
}

/// Apply a suppression policy, treating rules that expired before `now` as absent.
///
/// Results whose issues are all suppressed are kept with an empty issue list.
pub fn filter_ignored_at(
    policy: Option<&SuppressionPolicy>,
    results: &[FormattedResult],
    now: DateTime<Utc>,
) -> FilterOutcome {
    let Some(policy) = policy.filter(|p| !p.is_empty()) else {
        return FilterOutcome {
            filtered: results.to_vec(),
            ignore_count: 0,
        };
    };

    results
        .iter()
        .map(|result| {
            let (kept, ignored): (Vec<FormattedIssue>, Vec<FormattedIssue>) =
                result.issues.iter().cloned().partition(|issue| {
                    let key = match_key(&result.file_path, issue);
                    match policy.find_match_at(&issue.id, &key, now) {
                        Some(rule) => {
                            debug!(
                                rule = %issue.id,
                                path = %key.join(PATH_SEPARATOR),
                                reason = rule.reason.as_deref().unwrap_or(""),
                                "Suppressed issue"
                            );
                            false
                        }
                        None => true,
                    }
                });
            (
                FormattedResult {
                    issues: kept,
                    ..result.clone()
                },
                ignored.len(),
            )
        })
        .fold(
            FilterOutcome {
                filtered: Vec::with_capacity(results.len()),
                ignore_count: 0,
            },
            |mut acc, (result, ignored)| {
                acc.filtered.push(result);
                acc.ignore_count += ignored;
                acc
            },
        )
}
