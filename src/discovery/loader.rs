//! Loads configuration files from a scan target into memory.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::patterns::is_ignorable_path;
use super::walker::{DirectoryWalker, WalkConfig};
use crate::error::{Result, ScanError};
use crate::parser::ParseError;
use crate::types::{FileType, ParseFailure, SourceFile};

/// Files of one directory. Terraform files in it share one variable context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDirectory {
    pub path: PathBuf,
    pub files: Vec<SourceFile>,
}

/// Everything the loader produced for a scan target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    pub directories: Vec<LoadedDirectory>,
    /// Files that were found but could not be read.
    pub failures: Vec<ParseFailure>,
    /// The target was a single file rather than a directory.
    pub single_file: bool,
}

impl LoadOutcome {
    pub fn file_count(&self) -> usize {
        self.directories.iter().map(|d| d.files.len()).sum()
    }
}

/// Discovers and reads configuration files.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    walk: WalkConfig,
    var_file: Option<PathBuf>,
}

impl Loader {
    pub fn new(walk: WalkConfig) -> Self {
        Self {
            walk,
            var_file: None,
        }
    }

    /// Add an explicit variable definitions file to the root directory's context.
    pub fn with_var_file(mut self, var_file: impl Into<PathBuf>) -> Self {
        self.var_file = Some(var_file.into());
        self
    }

    /// Load every recognized file under `path`.
    pub fn load(&self, path: &Path) -> Result<LoadOutcome> {
        if !path.exists() {
            return Err(ScanError::NotFound(path.to_path_buf()));
        }

        let mut outcome = if path.is_file() {
            self.load_single_file(path)?
        } else {
            self.load_directory(path)?
        };

        if let Some(var_file) = &self.var_file {
            let content =
                fs::read_to_string(var_file).map_err(|e| ScanError::read_var_file(var_file, e))?;
            let source = SourceFile::new(var_file, FileType::Tfvars, content);
            let root = if outcome.single_file {
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            } else {
                path.to_path_buf()
            };
            match outcome.directories.iter_mut().find(|d| d.path == root) {
                Some(directory) => directory.files.push(source),
                None => outcome.directories.insert(
                    0,
                    LoadedDirectory {
                        path: root,
                        files: vec![source],
                    },
                ),
            }
        }

        Ok(outcome)
    }

    fn load_single_file(&self, path: &Path) -> Result<LoadOutcome> {
        let Some(file_type) = FileType::from_path(path) else {
            debug!(path = %path.display(), "Unrecognized file extension");
            return Err(ScanError::NoFilesToScan);
        };
        if is_ignorable_path(path) {
            debug!(path = %path.display(), "Ignorable file name");
            return Err(ScanError::NoFilesToScan);
        }

        let content = fs::read_to_string(path).map_err(|e| ScanError::read_target(path, e))?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(LoadOutcome {
            directories: vec![LoadedDirectory {
                path: directory,
                files: vec![SourceFile::new(path, file_type, content)],
            }],
            failures: Vec::new(),
            single_file: true,
        })
    }

    fn load_directory(&self, root: &Path) -> Result<LoadOutcome> {
        let walker = DirectoryWalker::new(self.walk.clone());
        let found = walker.walk(root);
        let found_count: usize = found.iter().map(|d| d.files.len()).sum();
        info!(
            root = %root.display(),
            directories = found.len(),
            files = found_count,
            "Discovered configuration files"
        );

        if found_count == 0 {
            return Err(ScanError::NoFilesToScan);
        }

        let read: Vec<(PathBuf, Vec<std::result::Result<SourceFile, ParseFailure>>)> = found
            .into_par_iter()
            .map(|group| {
                let files = group
                    .files
                    .iter()
                    .filter_map(|p| FileType::from_path(p).map(|t| read_source(p, t)))
                    .collect();
                (group.directory, files)
            })
            .collect();

        let outcome = read.into_iter().fold(
            LoadOutcome::default(),
            |mut acc, (directory, files)| {
                let mut loaded = Vec::with_capacity(files.len());
                for file in files {
                    match file {
                        Ok(source) => loaded.push(source),
                        Err(failure) => acc.failures.push(failure),
                    }
                }
                if !loaded.is_empty() {
                    acc.directories.push(LoadedDirectory {
                        path: directory,
                        files: loaded,
                    });
                }
                acc
            },
        );

        if outcome.directories.is_empty() {
            return Err(ScanError::NoFilesToScan);
        }

        Ok(outcome)
    }
}

fn read_source(path: &Path, file_type: FileType) -> std::result::Result<SourceFile, ParseFailure> {
    fs::read_to_string(path)
        .map(|content| SourceFile::new(path, file_type, content))
        .map_err(|e| {
            debug!(path = %path.display(), error = %e, "Failed to read file");
            let source = SourceFile::new(path, file_type, String::new());
            ParseFailure::new(&source, ParseError::Unreadable(e.to_string()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_directory_mixed_types() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.tf"), "resource \"a\" \"b\" {}").unwrap();
        fs::write(dir.path().join("pod.yaml"), "kind: Pod").unwrap();
        fs::write(dir.path().join("script.sh"), "echo").unwrap();
        fs::write(dir.path().join("notes.md"), "notes").unwrap();

        let outcome = Loader::default().load(dir.path()).unwrap();
        assert!(!outcome.single_file);
        assert_eq!(outcome.directories.len(), 1);
        assert_eq!(outcome.file_count(), 2);
        let types: Vec<FileType> = outcome.directories[0]
            .files
            .iter()
            .map(|f| f.file_type)
            .collect();
        assert_eq!(types, vec![FileType::Tf, FileType::Yaml]);
    }

    #[test]
    fn test_load_directory_without_config_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# nothing").unwrap();

        let err = Loader::default().load(dir.path()).unwrap_err();
        assert!(err.is_no_files());
    }

    #[test]
    fn test_load_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("deployment.yml");
        fs::write(&file, "kind: Deployment").unwrap();

        let outcome = Loader::default().load(&file).unwrap();
        assert!(outcome.single_file);
        assert_eq!(outcome.directories[0].path, dir.path());
        assert_eq!(outcome.directories[0].files[0].file_content, "kind: Deployment");
    }

    #[test]
    fn test_load_single_file_unrecognized_extension() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Dockerfile");
        fs::write(&file, "FROM alpine").unwrap();

        let err = Loader::default().load(&file).unwrap_err();
        assert!(err.is_no_files());
    }

    #[test]
    fn test_load_single_ignorable_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("~main.tf");
        fs::write(&file, "").unwrap();

        let err = Loader::default().load(&file).unwrap_err();
        assert!(err.is_no_files());
    }

    #[test]
    fn test_load_missing_path() {
        let err = Loader::default()
            .load(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn test_var_file_joins_root_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.tf"), "").unwrap();
        let vars_dir = TempDir::new().unwrap();
        let var_file = vars_dir.path().join("prod.tfvars");
        fs::write(&var_file, "region = \"eu-west-1\"").unwrap();

        let outcome = Loader::default()
            .with_var_file(&var_file)
            .load(dir.path())
            .unwrap();
        let root = &outcome.directories[0];
        assert_eq!(root.files.len(), 2);
        assert_eq!(root.files[1].file_type, FileType::Tfvars);
    }
}
