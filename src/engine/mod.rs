//! Policy engine adapter.
//!
//! Routes each parsed document to the evaluator of its engine type:
//! - `PolicyEvaluator` is the opaque `evaluate(document)` capability
//! - `BundleProvider` locates and loads evaluators per engine type
//! - `PolicyCache` keeps loaded evaluators for the life of the process
//! - `RuleSetEvaluator` evaluates the local JSON rule bundles
//!
//! Load and evaluation failures abort the scan.

pub mod bundle;
pub mod cache;
pub mod custom;
pub mod error;
pub mod rules;
pub mod traits;

pub use bundle::{LocalBundleProvider, bundle_prefix, default_rules_dir};
pub use cache::PolicyCache;
pub use custom::{is_valid_custom_id, rejection_reason, validate_custom_violations};
pub use error::EngineError;
pub use rules::{Check, PolicyData, RuleDefinition, RuleSet, RuleSetEvaluator};
pub use traits::{BundleProvider, PolicyBundle, PolicyEvaluator};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, ScanError};
use crate::types::{EngineType, ParseFailure, ParsedDocument, ScanResult, Severity};

/// Results of one engine pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutcome {
    pub results: Vec<ScanResult>,
    /// Custom rule results that failed validation, one entry per result.
    pub rejected: Vec<ParseFailure>,
}

/// Evaluates parsed documents against the policies of their engine type.
pub struct PolicyEngine {
    provider: Arc<dyn BundleProvider>,
    cache: Arc<PolicyCache>,
    custom_rules: bool,
    severity_overrides: HashMap<String, Severity>,
}

impl PolicyEngine {
    pub fn new(provider: Arc<dyn BundleProvider>) -> Self {
        Self {
            provider,
            cache: Arc::new(PolicyCache::new()),
            custom_rules: false,
            severity_overrides: HashMap::new(),
        }
    }

    /// Share a cache with other engines of the same process.
    pub fn with_cache(mut self, cache: Arc<PolicyCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Also evaluate every document against the custom rule bundle.
    pub fn with_custom_rules(mut self, enabled: bool) -> Self {
        self.custom_rules = enabled;
        self
    }

    /// Replace the severity of matching public ids after evaluation.
    pub fn with_severity_overrides(mut self, overrides: HashMap<String, Severity>) -> Self {
        self.severity_overrides = overrides;
        self
    }

    pub fn cache(&self) -> &PolicyCache {
        &self.cache
    }

    /// Cached evaluator for an engine type, loading it on first use.
    pub fn evaluator(&self, engine: EngineType) -> Result<Arc<dyn PolicyEvaluator>> {
        self.cache
            .get_or_load(engine, || self.provider.load(engine))
            .map_err(|source| ScanError::PolicyLoad { engine, source })
    }

    /// Evaluate every document, in order.
    ///
    /// With custom rules enabled each document is evaluated a second time as
    /// an `EngineType::Custom` document; those results follow the built-in ones.
    pub fn scan(&self, documents: Vec<ParsedDocument>) -> Result<EngineOutcome> {
        let documents = if self.custom_rules {
            let custom: Vec<ParsedDocument> = documents
                .iter()
                .map(|doc| doc.for_engine(EngineType::Custom))
                .collect();
            documents.into_iter().chain(custom).collect()
        } else {
            documents
        };

        info!(documents = documents.len(), "Evaluating policies");
        documents
            .into_iter()
            .try_fold(EngineOutcome::default(), |mut outcome, document| {
                let (result, rejected) = self.scan_document(document)?;
                outcome.results.push(result);
                outcome.rejected.extend(rejected);
                Ok(outcome)
            })
    }

    fn scan_document(&self, document: ParsedDocument) -> Result<(ScanResult, Vec<ParseFailure>)> {
        let engine = document.engine_type;
        let evaluator = self.evaluator(engine)?;
        let violations = evaluator
            .evaluate(&document.canonical_content)
            .map_err(|source| ScanError::PolicyEvaluation {
                engine,
                path: document.file_path.clone(),
                source,
            })?;

        let (mut violations, rejected) = if engine == EngineType::Custom {
            let (kept, rejected) = validate_custom_violations(violations);
            let rejected = rejected
                .into_iter()
                .map(|error| ParseFailure::for_document(&document, error))
                .collect();
            (kept, rejected)
        } else {
            (violations, Vec::new())
        };
        for violation in &mut violations {
            if let Some(severity) = self.severity_overrides.get(&violation.public_id) {
                violation.severity = *severity;
            }
        }

        debug!(
            path = %document.file_path.display(),
            engine = %engine,
            violations = violations.len(),
            "Evaluated document"
        );
        Ok((ScanResult::new(document, violations), rejected))
    }
}
