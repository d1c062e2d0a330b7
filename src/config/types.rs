//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::parser::PlanScanMode;
use crate::types::Severity;

/// Main configuration structure for iac-scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan configuration (CLI options).
    pub scan: ScanConfig,
    /// Policy bundle locations.
    pub rules: RulesConfig,
    /// Replacement severities keyed by rule public id.
    pub severity_overrides: HashMap<String, Severity>,
}

/// Scan configuration (corresponds to CLI options).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Minimum severity to report.
    pub severity_threshold: Option<Severity>,
    /// Maximum directory depth below the scan root.
    pub detection_depth: Option<usize>,
    /// Terraform plan extraction mode: "delta" or "full".
    pub scan_mode: Option<PlanScanMode>,
    /// Paths relative to the scan root to skip.
    pub exclude: Vec<String>,
    /// Extra `.tfvars` file for the root directory.
    pub var_file: Option<PathBuf>,
    /// Resolve Terraform variable and local references.
    pub dereference_variables: bool,
    /// Suppression policy file.
    pub policy_file: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            severity_threshold: None,
            detection_depth: None,
            scan_mode: None,
            exclude: Vec::new(),
            var_file: None,
            dereference_variables: true,
            policy_file: None,
        }
    }
}

/// Policy bundle configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Directory holding `<prefix>_policy.json` bundles.
    pub rules_dir: Option<PathBuf>,
    /// Custom rule bundle directory or file.
    pub custom_rules: Option<PathBuf>,
}
