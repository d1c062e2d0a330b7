//! Declarative JSON rule sets.
//!
//! A rule selects nodes of the canonical document with a dotted selector
//! (`*` matches every key or array element) and reports a violation for each
//! selected node its `check` holds for. A check describes the
//! misconfiguration, not the desired state:
//!
//! ```json
//! {
//!   "rules": [{
//!     "publicId": "TF-AWS-001",
//!     "title": "Security group allows ingress from 0.0.0.0/0",
//!     "severity": "high",
//!     "type": "terraform",
//!     "subType": "aws_security_group",
//!     "selector": "resource.aws_security_group.*.ingress.cidr_blocks",
//!     "check": { "kind": "contains", "value": "0.0.0.0/0" }
//!   }]
//! }
//! ```
//!
//! A named selector segment applied to an array applies to every element,
//! so repeated blocks match whether they decode as one object or a list.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::error::EngineError;
use super::traits::{PolicyBundle, PolicyEvaluator};
use crate::types::{PolicyViolation, Severity};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    Equals { value: Value },
    NotEquals { value: Value },
    Exists,
    Missing,
    Matches { pattern: String },
    Contains { value: Value },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub public_id: String,
    pub title: String,
    /// Unknown severities decode as `None` and are never reported.
    #[serde(deserialize_with = "lenient_severity")]
    pub severity: Severity,
    #[serde(rename = "type", default)]
    pub policy_type: String,
    #[serde(default)]
    pub sub_type: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub resolve: String,
    #[serde(default)]
    pub references: Vec<String>,
    /// Top-level fields the document must carry for the rule to apply.
    #[serde(default)]
    pub when: Map<String, Value>,
    pub selector: String,
    pub check: Check,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// Metadata blob shipped next to a rule set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyData {
    #[serde(default)]
    pub severity_overrides: HashMap<String, Severity>,
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Severity, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or(Severity::None))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Any,
    Key(String),
}

type Node<'a> = (Vec<String>, &'a Value);

#[derive(Debug)]
struct CompiledRule {
    definition: RuleDefinition,
    selector: Vec<Segment>,
    pattern: Option<Regex>,
}

impl CompiledRule {
    fn compile(definition: RuleDefinition) -> Result<Self, EngineError> {
        let invalid = |reason: String| EngineError::InvalidRule {
            id: definition.public_id.clone(),
            reason,
        };

        if definition.selector.trim().is_empty() {
            return Err(invalid("empty selector".to_string()));
        }
        let selector = definition
            .selector
            .split('.')
            .map(|segment| match segment {
                "*" => Segment::Any,
                key => Segment::Key(key.to_string()),
            })
            .collect();

        let pattern = match &definition.check {
            Check::Matches { pattern } => Some(
                Regex::new(pattern).map_err(|e| invalid(format!("bad pattern '{pattern}': {e}")))?,
            ),
            _ => None,
        };

        Ok(Self {
            definition,
            selector,
            pattern,
        })
    }

    fn applies_to(&self, document: &Value) -> bool {
        self.definition
            .when
            .iter()
            .all(|(key, expected)| document.get(key) == Some(expected))
    }

    /// Paths of every selected node the check holds for.
    fn matches(&self, document: &Value) -> Vec<Vec<String>> {
        let Some((last, parents)) = self.selector.split_last() else {
            return Vec::new();
        };

        let frontier = parents.iter().fold(vec![(Vec::new(), document)], |nodes, segment| {
            nodes
                .into_iter()
                .flat_map(|node| step(node, segment))
                .collect()
        });

        frontier
            .into_iter()
            .flat_map(|(path, parent)| leaves(path, parent, last))
            .filter(|(_, value)| self.holds(*value))
            .map(|(path, _)| path)
            .collect()
    }

    fn holds(&self, value: Option<&Value>) -> bool {
        let value = value.filter(|v| !v.is_null());
        match (&self.definition.check, value) {
            (Check::Missing, value) => value.is_none(),
            (_, None) => false,
            (Check::Exists, Some(_)) => true,
            (Check::Equals { value: expected }, Some(actual)) => actual == expected,
            (Check::NotEquals { value: expected }, Some(actual)) => actual != expected,
            (Check::Matches { .. }, Some(Value::String(s))) => {
                self.pattern.as_ref().is_some_and(|re| re.is_match(s))
            }
            (Check::Matches { .. }, Some(_)) => false,
            (Check::Contains { value: expected }, Some(Value::Array(items))) => {
                items.contains(expected)
            }
            (Check::Contains { value: Value::String(needle) }, Some(Value::String(s))) => {
                s.contains(needle.as_str())
            }
            (Check::Contains { .. }, Some(_)) => false,
        }
    }

    fn violation(&self, path: Vec<String>) -> PolicyViolation {
        let rule = &self.definition;
        PolicyViolation {
            public_id: rule.public_id.clone(),
            policy_type: rule.policy_type.clone(),
            sub_type: rule.sub_type.clone(),
            title: rule.title.clone(),
            severity: rule.severity,
            message: path_message(&path),
            issue: rule.issue.clone(),
            impact: rule.impact.clone(),
            resolve: rule.resolve.clone(),
            references: rule.references.clone(),
            doc_id: None,
        }
    }
}

/// Dotted path of a match. Keys that contain a dot, such as the annotation
/// `a.b/c`, are bracketed onto the previous segment: `annotations[a.b/c]`.
fn path_message(path: &[String]) -> String {
    path.iter().fold(String::new(), |mut message, segment| {
        if segment.contains('.') {
            message.push_str(&format!("[{segment}]"));
        } else {
            if !message.is_empty() {
                message.push('.');
            }
            message.push_str(segment);
        }
        message
    })
}

fn child_path(path: &[String], key: impl ToString) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(key.to_string());
    next
}

fn children<'a>((path, value): Node<'a>) -> Vec<Node<'a>> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (child_path(&path, k), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (child_path(&path, i), v))
            .collect(),
        _ => Vec::new(),
    }
}

fn step<'a>(node: Node<'a>, segment: &Segment) -> Vec<Node<'a>> {
    let (path, value) = node;
    match (segment, value) {
        (Segment::Any, _) => children((path, value)),
        (Segment::Key(key), Value::Object(map)) => map
            .get(key)
            .map(|v| vec![(child_path(&path, key), v)])
            .unwrap_or_default(),
        (Segment::Key(_), Value::Array(_)) => children((path, value))
            .into_iter()
            .flat_map(|element| step(element, segment))
            .collect(),
        _ => Vec::new(),
    }
}

/// Final selector step; a named key may be absent so `missing` can match.
fn leaves<'a>(path: Vec<String>, parent: &'a Value, last: &Segment) -> Vec<(Vec<String>, Option<&'a Value>)> {
    match (last, parent) {
        (Segment::Any, _) => children((path, parent))
            .into_iter()
            .map(|(p, v)| (p, Some(v)))
            .collect(),
        (Segment::Key(key), Value::Object(map)) => vec![(child_path(&path, key), map.get(key))],
        (Segment::Key(_), Value::Array(_)) => children((path, parent))
            .into_iter()
            .filter(|(_, element)| element.is_object())
            .flat_map(|(p, element)| leaves(p, element, last))
            .collect(),
        _ => Vec::new(),
    }
}

/// Evaluator backed by a JSON rule set.
#[derive(Debug)]
pub struct RuleSetEvaluator {
    rules: Vec<CompiledRule>,
}

impl RuleSetEvaluator {
    /// Compile a rule set, applying the data blob's severity overrides.
    pub fn new(rule_set: RuleSet, data: PolicyData) -> Result<Self, EngineError> {
        let rules = rule_set
            .rules
            .into_iter()
            .map(|mut definition| {
                if let Some(severity) = data.severity_overrides.get(&definition.public_id) {
                    definition.severity = *severity;
                }
                CompiledRule::compile(definition)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn from_bundle(bundle: &PolicyBundle) -> Result<Self, EngineError> {
        let rule_set: RuleSet = read_json(&bundle.policy)?;
        let data = match &bundle.data {
            Some(path) => read_json(path)?,
            None => PolicyData::default(),
        };
        debug!(
            policy = %bundle.policy.display(),
            rules = rule_set.rules.len(),
            "Loaded rule set"
        );
        Self::new(rule_set, data)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, EngineError> {
    let content = fs::read_to_string(path).map_err(|e| EngineError::read(path, e))?;
    serde_json::from_str(&content).map_err(|e| EngineError::malformed(path, e))
}

impl PolicyEvaluator for RuleSetEvaluator {
    fn evaluate(&self, document: &Value) -> Result<Vec<PolicyViolation>, EngineError> {
        if !document.is_object() {
            return Err(EngineError::Evaluation(
                "document root must be an object".to_string(),
            ));
        }
        Ok(self
            .rules
            .iter()
            .filter(|rule| rule.applies_to(document))
            .flat_map(|rule| {
                rule.matches(document)
                    .into_iter()
                    .map(|path| rule.violation(path))
            })
            .collect())
    }
}
