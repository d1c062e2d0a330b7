//! Load → parse → evaluate → format → filter.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::report::ScanReport;
use crate::config::EffectiveConfig;
use crate::discovery::{ExcludeList, Loader, WalkConfig};
use crate::engine::{EngineOutcome, LocalBundleProvider, PolicyCache, PolicyEngine};
use crate::error::Result;
use crate::format::{IndentationResolver, LineNumberResolver, ResultsFormatter};
use crate::parser::{ParserOptions, ParserRegistry};
use crate::suppression::{FilterOutcome, SuppressionPolicy, filter_ignored};
use crate::types::{FormattedResult, ParseFailure, ParsingResults, Severity};

/// One configured scan. Stages run strictly in sequence.
pub struct ScanPipeline {
    loader: Loader,
    parsers: ParserRegistry,
    engine: PolicyEngine,
    severity_threshold: Option<Severity>,
    suppression: Option<SuppressionPolicy>,
    resolver: Box<dyn LineNumberResolver>,
}

impl ScanPipeline {
    pub fn new(loader: Loader, parsers: ParserRegistry, engine: PolicyEngine) -> Self {
        Self {
            loader,
            parsers,
            engine,
            severity_threshold: None,
            suppression: None,
            resolver: Box::new(IndentationResolver::new()),
        }
    }

    /// Build every stage from the effective configuration.
    ///
    /// The suppression policy is loaded here: an explicitly configured file
    /// must exist, the default file is optional.
    pub fn from_effective(effective: &EffectiveConfig, cache: Arc<PolicyCache>) -> Result<Self> {
        let mut walk = WalkConfig::new().with_exclude(ExcludeList::new(&effective.exclude));
        if let Some(depth) = effective.detection_depth {
            walk = walk.with_max_depth(depth);
        }
        let loader = match &effective.var_file {
            Some(var_file) => Loader::new(walk).with_var_file(var_file),
            None => Loader::new(walk),
        };

        let parsers = ParserRegistry::with_options(
            ParserOptions::default()
                .with_plan_scan_mode(effective.scan_mode)
                .with_dereference_variables(effective.dereference_variables)
                .with_environment(std::env::vars()),
        );

        let mut provider = LocalBundleProvider::new(&effective.rules_dir);
        if let Some(custom) = &effective.custom_rules {
            provider = provider.with_custom_rules(custom);
        }
        let engine = PolicyEngine::new(Arc::new(provider))
            .with_cache(cache)
            .with_custom_rules(effective.custom_rules.is_some())
            .with_severity_overrides(effective.severity_overrides.clone());

        let suppression = match &effective.policy_file {
            Some(path) => Some(SuppressionPolicy::load(path)?),
            None => {
                let default = effective.default_policy_path();
                if default.is_file() {
                    Some(SuppressionPolicy::load(&default)?)
                } else {
                    None
                }
            }
        };

        Ok(Self::new(loader, parsers, engine)
            .with_severity_threshold(effective.severity_threshold)
            .with_suppression_policy(suppression))
    }

    pub fn with_severity_threshold(mut self, threshold: Option<Severity>) -> Self {
        self.severity_threshold = threshold;
        self
    }

    pub fn with_suppression_policy(mut self, policy: Option<SuppressionPolicy>) -> Self {
        self.suppression = policy;
        self
    }

    pub fn with_line_number_resolver(mut self, resolver: Box<dyn LineNumberResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Scan a file or directory.
    ///
    /// Result paths of a directory scan are relative to that directory; a
    /// single-file scan reports the path as given.
    pub fn run(&self, target: &Path) -> Result<ScanReport> {
        let outcome = self.loader.load(target)?;
        info!(
            path = %target.display(),
            directories = outcome.directories.len(),
            files = outcome.file_count(),
            "Loaded configuration files"
        );

        let ParsingResults { parsed, failed } = self.parsers.parse_loaded(&outcome)?;
        for failure in &failed {
            warn!(
                path = %failure.file_path.display(),
                reason = %failure.failure_reason,
                "Skipping file that could not be parsed"
            );
        }

        let EngineOutcome { results, rejected } = self.engine.scan(parsed)?;
        let formatted = ResultsFormatter::new(self.resolver.as_ref())
            .with_severity_threshold(self.severity_threshold)
            .format(results);

        let root = (!outcome.single_file).then_some(target);
        let formatted: Vec<FormattedResult> = formatted
            .into_iter()
            .map(|result| FormattedResult {
                file_path: display_path(root, &result.file_path),
                ..result
            })
            .collect();
        let failures: Vec<ParseFailure> = failed
            .into_iter()
            .chain(rejected)
            .map(|failure| ParseFailure {
                file_path: display_path(root, &failure.file_path),
                ..failure
            })
            .collect();

        let FilterOutcome {
            filtered,
            ignore_count,
        } = filter_ignored(self.suppression.as_ref(), &formatted);
        info!(
            results = filtered.len(),
            ignored = ignore_count,
            failures = failures.len(),
            "Scan complete"
        );

        Ok(ScanReport {
            results: filtered,
            failures,
            ignore_count,
        })
    }
}

/// Path relative to the scan root when there is one.
fn display_path(root: Option<&Path>, path: &Path) -> PathBuf {
    root.and_then(|root| path.strip_prefix(root).ok())
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}
