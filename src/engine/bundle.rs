//! Rule bundles stored in a local directory.

use std::path::{Path, PathBuf};

use super::error::EngineError;
use super::traits::{BundleProvider, PolicyBundle};
use crate::types::EngineType;

pub const CUSTOM_POLICY_FILE: &str = "policy.json";
pub const CUSTOM_DATA_FILE: &str = "data.json";

/// File name prefix of an engine type's bundle.
pub fn bundle_prefix(engine: EngineType) -> &'static str {
    match engine {
        EngineType::Kubernetes => "k8s",
        EngineType::Terraform => "tf",
        EngineType::CloudFormation => "cloudformation",
        EngineType::Arm => "arm",
        EngineType::Custom => "custom",
    }
}

/// Default location of the built-in rule bundles.
pub fn default_rules_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("iac-scan")
        .join("rules")
}

/// Reads `<prefix>_policy.json` and `<prefix>_data.json` from a rules
/// directory, and the custom bundle from its own location.
#[derive(Debug, Clone)]
pub struct LocalBundleProvider {
    rules_dir: PathBuf,
    custom_rules: Option<PathBuf>,
}

impl LocalBundleProvider {
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_dir: rules_dir.into(),
            custom_rules: None,
        }
    }

    /// Custom rules are a directory with `policy.json` (and optionally
    /// `data.json`), or a single policy file.
    pub fn with_custom_rules(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_rules = Some(path.into());
        self
    }

    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    fn custom_bundle(&self) -> Result<PolicyBundle, EngineError> {
        let Some(path) = &self.custom_rules else {
            return Err(EngineError::MissingArtifact(
                self.rules_dir.join(CUSTOM_POLICY_FILE),
            ));
        };
        if path.is_file() {
            return Ok(PolicyBundle::new(path));
        }
        let policy = path.join(CUSTOM_POLICY_FILE);
        if !policy.is_file() {
            return Err(EngineError::MissingArtifact(policy));
        }
        let data = path.join(CUSTOM_DATA_FILE);
        Ok(with_optional_data(PolicyBundle::new(policy), data))
    }
}

impl Default for LocalBundleProvider {
    fn default() -> Self {
        Self::new(default_rules_dir())
    }
}

fn with_optional_data(bundle: PolicyBundle, data: PathBuf) -> PolicyBundle {
    if data.is_file() {
        bundle.with_data(data)
    } else {
        bundle
    }
}

impl BundleProvider for LocalBundleProvider {
    fn locate(&self, engine: EngineType) -> Result<PolicyBundle, EngineError> {
        if engine == EngineType::Custom {
            return self.custom_bundle();
        }
        let prefix = bundle_prefix(engine);
        let policy = self.rules_dir.join(format!("{prefix}_policy.json"));
        if !policy.is_file() {
            return Err(EngineError::MissingArtifact(policy));
        }
        let data = self.rules_dir.join(format!("{prefix}_data.json"));
        Ok(with_optional_data(PolicyBundle::new(policy), data))
    }
}
