//! Error types for iac-scan.
//!
//! - `ScanError`: the pipeline-wide error with full context preservation
//! - `InputKind` and `ParseFormat`: what was being read or decoded

mod context;
mod scan;

pub use context::{InputKind, ParseFormat};
pub use scan::ScanError;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScanError>;
