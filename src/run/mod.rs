//! Scan execution.
//!
//! Merges CLI and config file settings, builds the pipeline and runs it.

mod pipeline;
mod report;

pub use pipeline::ScanPipeline;
pub use report::{EXIT_ERROR, EXIT_ISSUES, EXIT_NO_FILES, EXIT_OK, ScanReport};

use std::sync::Arc;
use tracing::debug;

use crate::cli::Cli;
use crate::config::{Config, EffectiveConfig};
use crate::engine::PolicyCache;
use crate::error::Result;

/// Load the configuration a CLI invocation refers to.
///
/// `--config` must point at a readable file; otherwise the project root and
/// the user config directory are searched.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(Some(crate::config::project_root(&cli.path)))?,
    };
    Ok(config)
}

/// Run a scan with the given CLI options.
pub fn run_scan(cli: &Cli) -> Result<ScanReport> {
    let config = load_config(cli)?;
    run_scan_with_config(cli, &config, Arc::new(PolicyCache::new()))
}

/// Run a scan with an already loaded configuration, sharing `cache` with
/// other scans in the same process.
pub fn run_scan_with_config(
    cli: &Cli,
    config: &Config,
    cache: Arc<PolicyCache>,
) -> Result<ScanReport> {
    let effective = EffectiveConfig::from_cli_and_config(cli, config);
    debug!(config = ?effective, "Effective configuration");
    ScanPipeline::from_effective(&effective, cache)?.run(&effective.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_must_exist() {
        let cli = Cli::try_parse_from(["iac-scan", "--config", "/nonexistent/.iac-scan.yaml", "."])
            .unwrap();
        assert!(matches!(load_config(&cli).unwrap_err(), ScanError::Config(_)));
    }

    #[test]
    fn test_project_config_is_picked_up() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".iac-scan.yaml"),
            "scan:\n  severity_threshold: high\n",
        )
        .unwrap();
        let cli = Cli::try_parse_from(["iac-scan", dir.path().to_str().unwrap()]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(
            config.scan.severity_threshold,
            Some(crate::types::Severity::High)
        );
    }

    #[test]
    fn test_missing_target() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules");
        let cli = Cli::try_parse_from([
            "iac-scan",
            "--rules-dir",
            rules.to_str().unwrap(),
            dir.path().join("missing").to_str().unwrap(),
        ])
        .unwrap();
        let err = run_scan_with_config(&cli, &Config::default(), Arc::new(PolicyCache::new()))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }
}
