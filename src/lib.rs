pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod format;
pub mod parser;
pub mod reporter;
pub mod run;
pub mod suppression;
pub mod types;

pub use cli::{Cli, OutputFormat};
pub use config::{Config, EffectiveConfig};
pub use discovery::{Loader, WalkConfig};
pub use engine::{LocalBundleProvider, PolicyCache, PolicyEngine};
pub use error::{Result, ScanError};
pub use format::{ResultsFormatter, format_results};
pub use parser::{ParserOptions, ParserRegistry, PlanScanMode};
pub use reporter::{JsonReporter, Reporter, TerminalReporter, reporter_for};
pub use run::{ScanPipeline, ScanReport, run_scan};
pub use suppression::{FilterOutcome, SuppressionPolicy, filter_ignored};
pub use types::{
    EngineType, FileType, FormattedIssue, FormattedResult, ParsedDocument, PolicyViolation,
    ProjectType, ScanResult, Severity,
};
