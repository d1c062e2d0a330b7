//! Context carried by scan errors.

/// What kind of input a failed read was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A file under the scan target.
    ScanTarget,
    /// The `--var-file` Terraform variable definitions.
    VarFile,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScanTarget => write!(f, "scan target"),
            Self::VarFile => write!(f, "variable definitions file"),
        }
    }
}

/// Syntax a source file was decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFormat {
    Json,
    Yaml,
    Hcl,
    TerraformPlan,
}

impl std::fmt::Display for ParseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Yaml => write!(f, "YAML"),
            Self::Hcl => write!(f, "HCL"),
            Self::TerraformPlan => write!(f, "Terraform plan"),
        }
    }
}
