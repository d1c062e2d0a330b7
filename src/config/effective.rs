//! Effective configuration after merging CLI and config file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::types::Config;
use crate::cli::{Cli, OutputFormat};
use crate::engine::default_rules_dir;
use crate::parser::PlanScanMode;
use crate::types::Severity;

/// Default suppression policy file name, looked up in the project root.
pub const DEFAULT_POLICY_FILE: &str = ".iac-scan-policy.yaml";

/// Effective scan configuration after merging CLI and config file.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub severity_threshold: Option<Severity>,
    pub detection_depth: Option<usize>,
    pub scan_mode: PlanScanMode,
    pub exclude: Vec<String>,
    pub rules_dir: PathBuf,
    pub custom_rules: Option<PathBuf>,
    /// Explicitly configured suppression policy; it must exist.
    pub policy_file: Option<PathBuf>,
    pub var_file: Option<PathBuf>,
    pub dereference_variables: bool,
    pub severity_overrides: HashMap<String, Severity>,
}

impl EffectiveConfig {
    /// Merge CLI options with config file settings.
    ///
    /// - Value options: CLI takes precedence, fallback to config, then default
    /// - Lists: a non-empty CLI list replaces the config list
    /// - `--no-dereference` can only disable variable resolution
    pub fn from_cli_and_config(cli: &Cli, config: &Config) -> Self {
        let scan = &config.scan;
        let exclude = if cli.exclude.is_empty() {
            scan.exclude.clone()
        } else {
            cli.exclude.clone()
        };

        Self {
            path: cli.path.clone(),
            format: cli.format,
            severity_threshold: cli.severity_threshold.or(scan.severity_threshold),
            detection_depth: cli.detection_depth.or(scan.detection_depth),
            scan_mode: cli.scan.or(scan.scan_mode).unwrap_or_default(),
            exclude,
            rules_dir: cli
                .rules_dir
                .clone()
                .or_else(|| config.rules.rules_dir.clone())
                .unwrap_or_else(default_rules_dir),
            custom_rules: cli
                .custom_rules
                .clone()
                .or_else(|| config.rules.custom_rules.clone()),
            policy_file: cli.policy_path.clone().or_else(|| scan.policy_file.clone()),
            var_file: cli.var_file.clone().or_else(|| scan.var_file.clone()),
            dereference_variables: !cli.no_dereference && scan.dereference_variables,
            severity_overrides: config.severity_overrides.clone(),
        }
    }

    /// Directory config files and the default suppression policy live in.
    pub fn project_root(&self) -> &Path {
        project_root(&self.path)
    }

    /// Default suppression policy location for this target.
    pub fn default_policy_path(&self) -> PathBuf {
        self.project_root().join(DEFAULT_POLICY_FILE)
    }
}

/// A file target's project root is its parent directory.
pub fn project_root(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    }
}
