//! Terraform plan (`terraform show -json`) resource extraction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use super::error::ParseError;
use crate::types::{EngineType, ParsedDocument, SourceFile};

/// Which part of a plan is scanned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanScanMode {
    /// Only resources the plan creates or changes.
    #[default]
    Delta,
    /// The whole planned state.
    Full,
}

impl std::fmt::Display for PlanScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delta => write!(f, "delta"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Action sequences whose post-change state is scanned in delta mode.
const DELTA_SCAN_ACTIONS: [&[&str]; 4] = [
    &["create"],
    &["update"],
    &["create", "delete"],
    &["delete", "create"],
];

#[derive(Debug, Deserialize)]
struct TerraformPlan {
    #[serde(default)]
    planned_values: Option<PlannedValues>,
    #[serde(default)]
    resource_changes: Vec<ResourceChange>,
}

#[derive(Debug, Deserialize)]
struct PlannedValues {
    #[serde(default)]
    root_module: Option<PlanModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PlanModule {
    #[serde(default)]
    resources: Vec<PlanResource>,
    #[serde(default)]
    child_modules: Vec<PlanModule>,
}

#[derive(Debug, Deserialize)]
struct PlanResource {
    #[serde(default)]
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    index: Option<Value>,
    #[serde(default)]
    values: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceChange {
    #[serde(default)]
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    index: Option<Value>,
    #[serde(default)]
    change: Option<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    #[serde(default)]
    actions: Vec<String>,
    #[serde(default)]
    after: Option<Value>,
}

/// Whether a JSON document is a Terraform plan.
pub fn is_terraform_plan(document: &Value) -> bool {
    document
        .pointer("/planned_values/root_module")
        .is_some_and(|m| !m.is_null())
        && document.get("resource_changes").is_some()
}

/// Extract the scan input of a plan as a single Terraform document.
pub fn parse_plan(
    source: &SourceFile,
    document: &Value,
    mode: PlanScanMode,
) -> Result<Vec<ParsedDocument>, ParseError> {
    let plan: TerraformPlan = serde_json::from_value(document.clone())
        .map_err(|e| ParseError::InvalidTerraformPlan(e.to_string()))?;

    let scan_input = match mode {
        PlanScanMode::Full => extract_full_scan(&plan),
        PlanScanMode::Delta => extract_delta_scan(&plan),
    };

    Ok(vec![ParsedDocument::new(
        source,
        scan_input.into_value(),
        EngineType::Terraform,
    )])
}

/// Resources folded into `resource`/`data` → type → name → attributes.
#[derive(Debug, Default)]
struct ScanInput {
    resource: Map<String, Value>,
    data: Map<String, Value>,
}

impl ScanInput {
    fn add(mut self, mode: &str, resource_type: &str, name: &str, index: Option<&Value>, values: Option<Value>) -> Self {
        let key = match index {
            Some(Value::String(i)) => format!("{name}_{i}"),
            Some(Value::Null) | None => name.to_owned(),
            Some(i) => format!("{name}_{i}"),
        };
        let values = match values {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(v) => v,
        };
        let target = if mode == "data" {
            &mut self.data
        } else {
            &mut self.resource
        };
        if let Value::Object(by_name) = target
            .entry(resource_type.to_owned())
            .or_insert_with(|| Value::Object(Map::new()))
        {
            by_name.insert(key, values);
        }
        self
    }

    fn into_value(self) -> Value {
        let mut root = Map::new();
        root.insert("resource".to_owned(), Value::Object(self.resource));
        root.insert("data".to_owned(), Value::Object(self.data));
        Value::Object(root)
    }
}

fn extract_full_scan(plan: &TerraformPlan) -> ScanInput {
    let Some(root) = plan
        .planned_values
        .as_ref()
        .and_then(|p| p.root_module.as_ref())
    else {
        return ScanInput::default();
    };

    let mut modules = vec![root];
    let mut resources = Vec::new();
    while let Some(module) = modules.pop() {
        resources.extend(module.resources.iter());
        modules.extend(module.child_modules.iter().rev());
    }

    resources.into_iter().fold(ScanInput::default(), |acc, r| {
        acc.add(
            &r.mode,
            &r.resource_type,
            &r.name,
            r.index.as_ref(),
            r.values.clone(),
        )
    })
}

fn extract_delta_scan(plan: &TerraformPlan) -> ScanInput {
    plan.resource_changes
        .iter()
        .fold(ScanInput::default(), |acc, r| {
            let Some(change) = &r.change else {
                return acc;
            };
            if !is_scannable_change(&change.actions) {
                trace!(resource = %r.name, actions = ?change.actions, "Skipping resource change");
                return acc;
            }
            acc.add(
                &r.mode,
                &r.resource_type,
                &r.name,
                r.index.as_ref(),
                change.after.clone(),
            )
        })
}

fn is_scannable_change(actions: &[String]) -> bool {
    DELTA_SCAN_ACTIONS
        .iter()
        .any(|valid| valid.len() == actions.len() && valid.iter().zip(actions).all(|(a, b)| a == b))
}
