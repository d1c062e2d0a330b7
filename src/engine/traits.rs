//! Seams between the engine adapter and its collaborators.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::EngineError;
use super::rules::RuleSetEvaluator;
use crate::types::{EngineType, PolicyViolation};

/// A loaded policy artifact for one engine type.
pub trait PolicyEvaluator: Send + Sync {
    /// Evaluate one canonical document.
    fn evaluate(&self, document: &Value) -> Result<Vec<PolicyViolation>, EngineError>;
}

/// Location of a policy artifact and its optional metadata blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyBundle {
    pub policy: PathBuf,
    pub data: Option<PathBuf>,
}

impl PolicyBundle {
    pub fn new(policy: impl Into<PathBuf>) -> Self {
        Self {
            policy: policy.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<PathBuf>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Supplies policy artifacts by engine type.
pub trait BundleProvider: Send + Sync {
    /// Find the bundle for an engine type.
    fn locate(&self, engine: EngineType) -> Result<PolicyBundle, EngineError>;

    /// Load and initialize the evaluator for an engine type.
    fn load(&self, engine: EngineType) -> Result<Arc<dyn PolicyEvaluator>, EngineError> {
        let bundle = self.locate(engine)?;
        Ok(Arc::new(RuleSetEvaluator::from_bundle(&bundle)?))
    }
}
