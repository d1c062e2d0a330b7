//! Validation of violations produced by user-supplied rule bundles.
//!
//! A rejected violation is not reported as an issue; the caller turns it into
//! a failure entry for the file it was raised against.

use tracing::warn;

use crate::parser::ParseError;
use crate::types::{PolicyViolation, Severity};

/// Prefix reserved for built-in rule identifiers.
pub const RESERVED_ID_PREFIX: &str = "SNYK-CC-";

/// Custom rule ids are uppercase and must not claim the built-in namespace.
pub fn is_valid_custom_id(public_id: &str) -> bool {
    custom_id_problem(public_id).is_none()
}

fn custom_id_problem(public_id: &str) -> Option<String> {
    if public_id.starts_with(RESERVED_ID_PREFIX) {
        Some(format!("publicId must not start with {RESERVED_ID_PREFIX}"))
    } else if public_id != public_id.to_uppercase() {
        Some(format!(
            "publicId must be uppercase, change it to {}",
            public_id.to_uppercase()
        ))
    } else if public_id.is_empty() {
        Some("publicId must not be empty".to_string())
    } else {
        None
    }
}

/// Why a custom violation cannot be reported, if it cannot.
pub fn rejection_reason(violation: &PolicyViolation) -> Option<String> {
    custom_id_problem(&violation.public_id).or_else(|| {
        (violation.severity == Severity::None).then(|| {
            "severity must be low, medium, high or critical".to_string()
        })
    })
}

/// Split custom violations into reportable ones and rejections.
pub fn validate_custom_violations(
    violations: Vec<PolicyViolation>,
) -> (Vec<PolicyViolation>, Vec<ParseError>) {
    violations
        .into_iter()
        .fold((Vec::new(), Vec::new()), |(mut kept, mut rejected), violation| {
            match rejection_reason(&violation) {
                Some(reason) => {
                    warn!(rule = %violation.public_id, %reason, "Rejected custom rule result");
                    rejected.push(ParseError::InvalidCustomRule {
                        id: violation.public_id,
                        reason,
                    });
                }
                None => kept.push(violation),
            }
            (kept, rejected)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_ids() {
        assert!(is_valid_custom_id("CUSTOM-1"));
        assert!(!is_valid_custom_id("custom-1"));
        assert!(!is_valid_custom_id("SNYK-CC-TF-1"));
        assert!(!is_valid_custom_id(""));
    }

    #[test]
    fn test_validate_custom_violations() {
        let (kept, rejected) = validate_custom_violations(vec![
            PolicyViolation::new("CUSTOM-1", "ok", Severity::High, "a"),
            PolicyViolation::new("CUSTOM-2", "no severity", Severity::None, "a"),
            PolicyViolation::new("Custom-3", "lowercase", Severity::Low, "a"),
            PolicyViolation::new("SNYK-CC-4", "reserved", Severity::Low, "a"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].public_id, "CUSTOM-1");

        let ids: Vec<&str> = rejected
            .iter()
            .map(|e| match e {
                ParseError::InvalidCustomRule { id, .. } => id.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(ids, vec!["CUSTOM-2", "Custom-3", "SNYK-CC-4"]);
        assert!(rejected[0].to_string().contains("severity"));
        assert!(rejected[1].to_string().contains("CUSTOM-3"));
        assert!(rejected[2].to_string().contains("SNYK-CC-"));
    }

    #[test]
    fn test_reserved_prefix_wins_over_other_problems() {
        let violation = PolicyViolation::new("SNYK-CC-9", "x", Severity::None, "a");
        assert!(rejection_reason(&violation).unwrap().contains("SNYK-CC-"));
    }
}
