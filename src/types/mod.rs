//! Data model shared by every pipeline stage.
//!
//! Values flow strictly forward: `SourceFile` → `ParsedDocument` /
//! `ParseFailure` → `ScanResult` → `FormattedResult`.

mod document;
mod file;
mod result;
mod severity;
mod violation;

pub use document::{EngineType, ParseFailure, ParsedDocument, ParsingResults, ProjectType};
pub use file::{FileType, SourceFile};
pub use result::{FormattedIssue, FormattedResult};
pub use severity::Severity;
pub use violation::{PolicyViolation, ScanResult};
