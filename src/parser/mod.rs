//! Format parsing layer.
//!
//! This module turns loaded source files into canonical JSON documents:
//! - YAML (Kubernetes manifests, CloudFormation templates, multi-document)
//! - JSON (Terraform plans, ARM templates, Kubernetes, CloudFormation)
//! - Terraform HCL with per-directory variable resolution
//!
//! Each file-type parser implements the `ContentParser` trait; the
//! `ParserRegistry` drives them directory by directory.

pub mod arm;
pub mod error;
pub mod json;
pub mod plan;
pub mod terraform;
pub mod traits;
pub mod variables;
pub mod yaml;
pub mod yaml_value;

pub use error::ParseError;
pub use json::JsonParser;
pub use plan::PlanScanMode;
pub use terraform::{TerraformParser, parse_hcl};
pub use traits::{ContentParser, ParseContext};
pub use variables::{TF_VAR_PREFIX, VarsContext};
pub use yaml::YamlParser;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::discovery::{LoadOutcome, LoadedDirectory};
use crate::error::{Result, ScanError};
use crate::types::{FileType, ParseFailure, ParsedDocument, ParsingResults, SourceFile};

/// Options shared by every parsing pass of a scan.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub plan_scan_mode: PlanScanMode,
    /// Resolve `var.*` and `local.*` references in Terraform files.
    pub dereference_variables: bool,
    /// Environment visible to Terraform variable resolution.
    pub environment: Vec<(String, String)>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            plan_scan_mode: PlanScanMode::default(),
            dereference_variables: true,
            environment: Vec::new(),
        }
    }
}

impl ParserOptions {
    pub fn with_plan_scan_mode(mut self, mode: PlanScanMode) -> Self {
        self.plan_scan_mode = mode;
        self
    }

    pub fn with_dereference_variables(mut self, enabled: bool) -> Self {
        self.dereference_variables = enabled;
        self
    }

    /// Capture the `TF_VAR_*` variables of an environment.
    pub fn with_environment<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = env
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(TF_VAR_PREFIX))
            .collect();
        self
    }
}

/// Registry of all available parsers.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ContentParser>>,
    options: ParserOptions,
}

impl ParserRegistry {
    /// Create a new registry with all default parsers.
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            parsers: vec![
                Box::new(TerraformParser::new()),
                Box::new(JsonParser::new()),
                Box::new(YamlParser::new()),
            ],
            options,
        }
    }

    /// Find a parser that can handle the given file type.
    pub fn find_parser(&self, file_type: FileType) -> Option<&dyn ContentParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(file_type))
            .map(|p| p.as_ref())
    }

    /// Parse one file with the parser for its type.
    pub fn parse_file(
        &self,
        source: &SourceFile,
        context: &ParseContext,
    ) -> std::result::Result<Vec<ParsedDocument>, ParseError> {
        match self.find_parser(source.file_type) {
            Some(parser) => parser.parse(source, context),
            None => Err(ParseError::UnsupportedFileType(
                source.file_type.to_string(),
            )),
        }
    }

    /// Build the parse context of a directory.
    ///
    /// Variable files that fail to parse are reported; `.tf` files that fail
    /// are skipped here and reported when they are parsed themselves.
    pub fn context_for(&self, directory: &LoadedDirectory) -> (ParseContext, Vec<ParseFailure>) {
        let context = ParseContext::new(self.options.plan_scan_mode);
        let has_terraform = directory.files.iter().any(|f| f.file_type == FileType::Tf);
        if !self.options.dereference_variables || !has_terraform {
            return (context, Vec::new());
        }

        let mut failures = Vec::new();
        let mut tf_bodies = Vec::new();
        let mut tfvars_bodies = Vec::new();
        for source in &directory.files {
            match source.file_type {
                FileType::Tf => {
                    if let Ok(body) = terraform::parse_hcl(&source.file_content) {
                        tf_bodies.push(body);
                    }
                }
                FileType::Tfvars => match terraform::parse_hcl(&source.file_content) {
                    Ok(body) => tfvars_bodies.push(body),
                    Err(err) => failures.push(ParseFailure::new(source, err)),
                },
                _ => {}
            }
        }

        let env = self
            .options
            .environment
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()));
        let variables = VarsContext::build(&tf_bodies, &tfvars_bodies, env);
        debug!(
            directory = %directory.path.display(),
            inputs = variables.inputs.len(),
            locals = variables.locals.len(),
            "Built Terraform variable context"
        );
        (context.with_variables(variables), failures)
    }

    /// Parse every file of a directory. Failures never abort sibling files.
    pub fn parse_directory(&self, directory: &LoadedDirectory) -> ParsingResults {
        let (context, variable_failures) = self.context_for(directory);

        let per_file: Vec<ParsingResults> = directory
            .files
            .par_iter()
            .filter(|source| source.file_type != FileType::Tfvars)
            .map(|source| match self.parse_file(source, &context) {
                Ok(parsed) => ParsingResults {
                    parsed,
                    failed: Vec::new(),
                },
                Err(err) => {
                    debug!(path = %source.file_path.display(), error = %err, "Failed to parse file");
                    ParsingResults {
                        parsed: Vec::new(),
                        failed: vec![ParseFailure::new(source, err)],
                    }
                }
            })
            .collect();

        per_file.into_iter().fold(
            ParsingResults {
                parsed: Vec::new(),
                failed: variable_failures,
            },
            ParsingResults::merge,
        )
    }

    /// Parse everything the loader produced.
    ///
    /// A single-file target fails with that file's error. A directory target
    /// collects failures, and fails only when nothing at all was parsed.
    pub fn parse_loaded(&self, outcome: &LoadOutcome) -> Result<ParsingResults> {
        if outcome.single_file {
            return self.parse_single(outcome);
        }

        let results = outcome
            .directories
            .par_iter()
            .map(|directory| self.parse_directory(directory))
            .collect::<Vec<_>>()
            .into_iter()
            .fold(
                ParsingResults {
                    parsed: Vec::new(),
                    failed: outcome.failures.clone(),
                },
                ParsingResults::merge,
            );

        info!(
            documents = results.parsed.len(),
            failures = results.failed.len(),
            "Parsed configuration files"
        );

        if results.parsed.is_empty() {
            if let [only] = results.failed.as_slice() {
                return Err(ScanError::parse_error(&only.file_path, only.error.clone()));
            }
            return Err(ScanError::NoFilesToScan);
        }
        Ok(results)
    }

    fn parse_single(&self, outcome: &LoadOutcome) -> Result<ParsingResults> {
        let mut results = ParsingResults::new();
        for directory in &outcome.directories {
            let (context, failures) = self.context_for(directory);
            results.failed.extend(failures);
            for source in directory
                .files
                .iter()
                .filter(|f| f.file_type != FileType::Tfvars)
            {
                let parsed = self
                    .parse_file(source, &context)
                    .map_err(|e| ScanError::parse_error(&source.file_path, e))?;
                results.parsed.extend(parsed);
            }
        }

        if results.parsed.is_empty() {
            return Err(ScanError::NoFilesToScan);
        }
        Ok(results)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
