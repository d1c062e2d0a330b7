//! Terraform input variable and local value resolution.
//!
//! Inputs are built from `variable` defaults, then `TF_VAR_*` environment
//! variables, then `.tfvars` files, each overriding the previous layer.
//! Locals are resolved in one pass in declaration order, so a local can see
//! inputs and the locals declared before it but never a later one.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::trace;

/// Environment variable prefix Terraform reads input values from.
pub const TF_VAR_PREFIX: &str = "TF_VAR_";

static INPUT_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{var\.(.+)\}$").unwrap());
static LOCAL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{local\.(.+)\}$").unwrap());

/// Top-level blocks whose values are rewritten.
const DEREFERENCED_BLOCKS: [&str; 2] = ["resource", "data"];

/// Resolved values shared by every Terraform file of one directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarsContext {
    pub inputs: Map<String, Value>,
    pub locals: Map<String, Value>,
}

impl VarsContext {
    /// Build the context from parsed `.tf` bodies, parsed `.tfvars` bodies and
    /// environment variables, in that precedence order.
    pub fn build<I, K, V>(tf_bodies: &[Value], tfvars_bodies: &[Value], env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut inputs = tf_bodies
            .iter()
            .flat_map(|body| blocks(body, "variable"))
            .fold(Map::new(), |mut acc, (name, block)| {
                if let Some(default) = block.get("default") {
                    acc.insert(name, default.clone());
                }
                acc
            });

        for (key, value) in env {
            if let Some(name) = key.as_ref().strip_prefix(TF_VAR_PREFIX)
                && !name.is_empty()
            {
                inputs.insert(name.to_owned(), Value::String(value.into()));
            }
        }

        for body in tfvars_bodies {
            if let Value::Object(values) = body {
                for (name, value) in values {
                    inputs.insert(name.clone(), value.clone());
                }
            }
        }

        let context = VarsContext {
            inputs,
            locals: Map::new(),
        };

        tf_bodies
            .iter()
            .flat_map(|body| blocks(body, "locals"))
            .fold(context, |mut acc, (name, value)| {
                let mut resolved = value;
                acc.substitute(&mut resolved);
                acc.locals.insert(name, resolved);
                acc
            })
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.locals.is_empty()
    }

    /// Look up the value a `${var.X}` or `${local.X}` expression refers to.
    ///
    /// `X` may be a dotted path into an object value.
    pub fn resolve(&self, expression: &str) -> Option<&Value> {
        let (values, reference) = if let Some(caps) = INPUT_REF.captures(expression) {
            (&self.inputs, caps.get(1)?.as_str())
        } else if let Some(caps) = LOCAL_REF.captures(expression) {
            (&self.locals, caps.get(1)?.as_str())
        } else {
            return None;
        };

        let mut segments = reference.split('.');
        let root = values.get(segments.next()?)?;
        let value = segments.try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })?;

        (!value.is_null()).then_some(value)
    }

    /// Replace references inside the `resource` and `data` blocks of a body.
    pub fn dereference(&self, body: &mut Value) {
        if self.is_empty() {
            return;
        }
        if let Value::Object(map) = body {
            for block in DEREFERENCED_BLOCKS {
                if let Some(value) = map.get_mut(block) {
                    self.substitute(value);
                }
            }
        }
    }

    /// Walk a value, swapping every string that is exactly one reference.
    fn substitute(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                if let Some(resolved) = self.resolve(s) {
                    trace!(reference = %s, "Resolved Terraform reference");
                    *value = resolved.clone();
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.substitute(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.substitute(item)),
            _ => {}
        }
    }
}

/// Named entries of a top-level block kind.
///
/// Repeated blocks may come back either merged into one object or as an
/// array of objects, so both shapes are accepted.
fn blocks(body: &Value, kind: &str) -> Vec<(String, Value)> {
    let entries = |value: &Value| -> Vec<(String, Value)> {
        match value {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Vec::new(),
        }
    };
    match body.get(kind) {
        Some(Value::Array(items)) => items.iter().flat_map(entries).collect(),
        Some(value) => entries(value),
        None => Vec::new(),
    }
}
