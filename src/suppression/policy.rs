//! Suppression policy file model.
//!
//! ```yaml
//! version: v1
//! ignore:
//!   K8S-001:
//!     - 'app.yaml > [DocId:0] > spec > containers[web] > privileged':
//!         reason: accepted for the debug pod
//!         expires: 2030-01-01T00:00:00Z
//!   TF-AWS-002:
//!     - '*':
//!         reason: buckets are private by account policy
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::error::SuppressionError;

/// Separator between path components in a rule path.
pub const PATH_SEPARATOR: &str = " > ";
pub const WILDCARD: &str = "*";

#[derive(Debug, Default, Deserialize)]
struct RawPolicy {
    #[serde(default)]
    ignore: BTreeMap<String, Vec<BTreeMap<String, Option<RawRule>>>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRule {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    expires: Option<String>,
    #[serde(default)]
    created: Option<String>,
}

/// Which issues of an id a rule covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePath {
    /// Every issue with the rule's id.
    Any,
    /// Exactly one `[filePath, ...issuePath]` key.
    Exact(Vec<String>),
}

impl RulePath {
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == WILDCARD {
            return Self::Any;
        }
        Self::Exact(raw.split(PATH_SEPARATOR).map(|c| c.trim().to_string()).collect())
    }

    /// Component-wise comparison; a prefix of the key is not a match.
    pub fn matches(&self, key: &[String]) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(components) => components.as_slice() == key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionRule {
    pub id: String,
    pub path: RulePath,
    pub reason: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

impl SuppressionRule {
    pub fn new(id: impl Into<String>, path: RulePath) -> Self {
        Self {
            id: id.into(),
            path,
            reason: None,
            expires: None,
            created: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
fn parse_date(id: &str, field: &'static str, raw: &str) -> Result<DateTime<Utc>, SuppressionError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| SuppressionError::InvalidDate {
            id: id.to_string(),
            field,
            value: raw.to_string(),
        })
}

/// User-maintained rules marking issues as intentionally ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionPolicy {
    rules: Vec<SuppressionRule>,
}

impl SuppressionPolicy {
    pub fn new(rules: Vec<SuppressionRule>) -> Self {
        Self { rules }
    }

    pub fn from_yaml(content: &str) -> Result<Self, SuppressionError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawPolicy = serde_yaml::from_str(content)?;
        Self::compile(raw)
    }

    pub fn load(path: &Path) -> Result<Self, SuppressionError> {
        let content = fs::read_to_string(path).map_err(|source| SuppressionError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawPolicy =
            serde_yaml::from_str(&content).map_err(|source| SuppressionError::ParseFile {
                path: path.to_path_buf(),
                source,
            })?;
        let policy = Self::compile(raw)?;
        debug!(path = %path.display(), rules = policy.rules.len(), "Loaded suppression policy");
        Ok(policy)
    }

    fn compile(raw: RawPolicy) -> Result<Self, SuppressionError> {
        let mut rules = Vec::new();
        for (id, entries) in raw.ignore {
            for (path, body) in entries.into_iter().flatten() {
                let body = body.unwrap_or_default();
                let expires = body
                    .expires
                    .as_deref()
                    .map(|raw| parse_date(&id, "expires", raw))
                    .transpose()?;
                let created = body
                    .created
                    .as_deref()
                    .map(|raw| parse_date(&id, "created", raw))
                    .transpose()?;
                rules.push(SuppressionRule {
                    id: id.clone(),
                    path: RulePath::parse(&path),
                    reason: body.reason,
                    expires,
                    created,
                });
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[SuppressionRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first live rule for `id` whose path covers `key`.
    pub fn find_match_at(
        &self,
        id: &str,
        key: &[String],
        now: DateTime<Utc>,
    ) -> Option<&SuppressionRule> {
        self.rules
            .iter()
            .filter(|rule| rule.id == id && !rule.is_expired_at(now))
            .find(|rule| rule.path.matches(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    const POLICY: &str = r#"
version: v1.25.0
ignore:
  K8S-001:
    - 'app.yaml > [DocId:0] > spec > privileged':
        reason: debug pod
        expires: 2030-01-01T00:00:00.000Z
        created: 2024-05-01
  TF-002:
    - '*':
        reason: accepted
  OLD-003:
    - '*':
        expires: 2020-01-01
"#;

    #[test]
    fn test_parse_policy() {
        let policy = SuppressionPolicy::from_yaml(POLICY).unwrap();
        assert_eq!(policy.rules().len(), 3);
        let k8s = policy.rules().iter().find(|r| r.id == "K8S-001").unwrap();
        assert_eq!(
            k8s.path,
            RulePath::Exact(key(&["app.yaml", "[DocId:0]", "spec", "privileged"]))
        );
        assert_eq!(k8s.reason.as_deref(), Some("debug pod"));
        assert_eq!(
            k8s.created,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_exact_match_requires_full_length() {
        let path = RulePath::parse("app.yaml > spec");
        assert!(path.matches(&key(&["app.yaml", "spec"])));
        assert!(!path.matches(&key(&["app.yaml", "spec", "privileged"])));
        assert!(!path.matches(&key(&["app.yaml"])));
    }

    #[test]
    fn test_expired_rules_are_skipped() {
        let policy = SuppressionPolicy::from_yaml(POLICY).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(policy.find_match_at("OLD-003", &key(&["a.tf"]), now).is_none());
        assert!(policy.find_match_at("TF-002", &key(&["a.tf", "resource"]), now).is_some());

        let later = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
        let k8s_key = key(&["app.yaml", "[DocId:0]", "spec", "privileged"]);
        assert!(policy.find_match_at("K8S-001", &k8s_key, now).is_some());
        assert!(policy.find_match_at("K8S-001", &k8s_key, later).is_none());
    }

    #[test]
    fn test_empty_and_null_bodies() {
        assert!(SuppressionPolicy::from_yaml("").unwrap().is_empty());
        let policy = SuppressionPolicy::from_yaml("ignore:\n  A:\n    - '*':\n").unwrap();
        assert_eq!(policy.rules()[0].path, RulePath::Any);
    }

    #[test]
    fn test_invalid_date() {
        let err = SuppressionPolicy::from_yaml("ignore:\n  A:\n    - '*':\n        expires: soon\n")
            .unwrap_err();
        assert!(matches!(err, SuppressionError::InvalidDate { field: "expires", .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SuppressionPolicy::load(Path::new("/nonexistent/.iac-scan-policy.yaml")).unwrap_err();
        assert!(matches!(err, SuppressionError::ReadFile { .. }));
    }
}
