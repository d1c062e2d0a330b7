//! Rendering of scan reports.

pub mod json;
pub mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::cli::OutputFormat;
use crate::run::ScanReport;

pub trait Reporter {
    fn report(&self, report: &ScanReport) -> String;
}

/// Reporter for the selected output format.
pub fn reporter_for(format: OutputFormat, verbose: bool) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Terminal => Box::new(TerminalReporter::new(verbose)),
        OutputFormat::Json => Box::new(JsonReporter::new()),
    }
}
