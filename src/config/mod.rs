//! Configuration layer for iac-scan.
//!
//! ## Layers
//! - `types`: Configuration type definitions
//! - `loading`: File loading logic
//! - `effective`: CLI + config merging

mod effective;
mod error;
mod loading;
mod types;

pub use effective::{DEFAULT_POLICY_FILE, EffectiveConfig, project_root};
pub use error::ConfigError;
pub use loading::PROJECT_CONFIG_FILES;
pub use types::{Config, RulesConfig, ScanConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PlanScanMode;
    use crate::types::Severity;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.scan.dereference_variables);
        assert!(config.scan.exclude.is_empty());
        assert!(config.severity_overrides.is_empty());
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".iac-scan.yaml"),
            r#"
scan:
  severity_threshold: medium
  scan_mode: full
  exclude:
    - modules/legacy
  dereference_variables: false
rules:
  rules_dir: /opt/iac-rules
severity_overrides:
  TF-AWS-001: critical
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.scan.severity_threshold, Some(Severity::Medium));
        assert_eq!(config.scan.scan_mode, Some(PlanScanMode::Full));
        assert_eq!(config.scan.exclude, vec!["modules/legacy"]);
        assert!(!config.scan.dereference_variables);
        assert_eq!(config.rules.rules_dir, Some(PathBuf::from("/opt/iac-rules")));
        assert_eq!(config.severity_overrides["TF-AWS-001"], Severity::Critical);
    }

    #[test]
    fn test_load_toml_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".iac-scan.toml"),
            "[scan]\ndetection_depth = 3\n\n[rules]\ncustom_rules = \"./custom\"\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.scan.detection_depth, Some(3));
        assert!(config.scan.dereference_variables);
        assert_eq!(config.rules.custom_rules, Some(PathBuf::from("./custom")));
    }

    #[test]
    fn test_load_json_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.json");
        fs::write(&path, r#"{"scan": {"policy_file": "policy.yaml"}}"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.scan.policy_file, Some(PathBuf::from("policy.yaml")));
    }

    #[test]
    fn test_yaml_takes_priority_over_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".iac-scan.yaml"), "scan:\n  detection_depth: 1\n").unwrap();
        fs::write(dir.path().join(".iac-scan.toml"), "[scan]\ndetection_depth = 5\n").unwrap();
        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.scan.detection_depth, Some(1));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".iac-scan.yaml"), "scan: [unclosed\n").unwrap();
        let err = Config::load(Some(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "x=1").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { ref extension, .. } if extension == "ini"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".iac-scan.yml");
        fs::write(&path, "").unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }
}
