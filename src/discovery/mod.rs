//! Discovery layer: turns a scan target into loaded source files.
//!
//! This module handles:
//! - Directory traversal with a depth limit and exclude list
//! - Skipping hidden, backup and unrecognized files
//! - Grouping files per directory for Terraform variable resolution

pub mod loader;
pub mod patterns;
pub mod walker;

pub use loader::{LoadOutcome, LoadedDirectory, Loader};
pub use patterns::{ExcludeList, is_ignorable_name, is_ignorable_path};
pub use walker::{DirectoryFiles, DirectoryWalker, WalkConfig};
