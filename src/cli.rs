use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::parser::PlanScanMode;
use crate::types::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "iac-scan",
    version,
    about = "Security scanner for infrastructure-as-code files",
    long_about = "iac-scan finds security misconfigurations in Terraform, Terraform plans, Kubernetes manifests, CloudFormation and ARM templates using local policy bundles."
)]
pub struct Cli {
    /// File or directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Only report issues at or above this severity
    #[arg(long, value_enum)]
    pub severity_threshold: Option<Severity>,

    /// How many directory levels below the target to scan (0 scans only the target)
    #[arg(long)]
    pub detection_depth: Option<usize>,

    /// Terraform plan scan mode
    #[arg(long, value_enum)]
    pub scan: Option<PlanScanMode>,

    /// Paths relative to the target to skip (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Directory holding the policy bundles
    #[arg(long)]
    pub rules_dir: Option<PathBuf>,

    /// Custom rule bundle (directory with policy.json, or a single file)
    #[arg(long)]
    pub custom_rules: Option<PathBuf>,

    /// Suppression policy file
    #[arg(long)]
    pub policy_path: Option<PathBuf>,

    /// Terraform variable definitions file
    #[arg(long)]
    pub var_file: Option<PathBuf>,

    /// Do not resolve Terraform variable and local references
    #[arg(long)]
    pub no_dereference: bool,

    /// Configuration file (defaults to .iac-scan.{yaml,yml,json,toml} in the target)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
