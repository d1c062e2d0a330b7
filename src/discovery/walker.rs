//! Directory walking for configuration file discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use super::patterns::{ExcludeList, is_ignorable_name};
use crate::types::FileType;

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkConfig {
    /// How many directory levels below the root to descend. None means unlimited.
    pub max_depth: Option<usize>,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
    /// Paths to leave out, relative to the walk root.
    pub exclude: ExcludeList,
}

impl WalkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum directory depth (0 scans only the root directory).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set whether to follow symlinks.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Set the exclude list.
    pub fn with_exclude(mut self, exclude: ExcludeList) -> Self {
        self.exclude = exclude;
        self
    }
}

/// Recognized files of one directory, in file-name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryFiles {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Walks a directory tree collecting recognized configuration files per directory.
pub struct DirectoryWalker {
    config: WalkConfig,
}

impl DirectoryWalker {
    /// Create a new DirectoryWalker with the given configuration.
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    fn is_skipped(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let skipped = entry.file_name().to_str().is_some_and(is_ignorable_name)
            || self.config.exclude.is_excluded(root, entry.path());
        if skipped {
            trace!(path = %entry.path().display(), "Skipping entry");
        }
        skipped
    }

    /// Walk `root` and return every non-empty directory with its recognized files.
    ///
    /// Directories come out in path order so repeated walks are identical.
    pub fn walk(&self, root: &Path) -> Vec<DirectoryFiles> {
        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            // files of a directory at depth N sit at walk depth N + 1
            walker = walker.max_depth(depth.saturating_add(1));
        }

        let grouped = walker
            .into_iter()
            .filter_entry(|e| !self.is_skipped(root, e))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "Failed to read directory entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(|e| FileType::from_path(e.path()).is_some())
            .fold(
                BTreeMap::<PathBuf, Vec<PathBuf>>::new(),
                |mut acc, entry| {
                    let directory = entry
                        .path()
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    acc.entry(directory)
                        .or_default()
                        .push(entry.into_path());
                    acc
                },
            );

        grouped
            .into_iter()
            .map(|(directory, files)| DirectoryFiles { directory, files })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("main.tf"), "").unwrap();
        fs::write(dir.path().join("README.md"), "# docs").unwrap();
        fs::write(dir.path().join(".hidden.yaml"), "kind: Pod").unwrap();

        let k8s = dir.path().join("k8s");
        fs::create_dir_all(&k8s).unwrap();
        fs::write(k8s.join("pod.yaml"), "kind: Pod").unwrap();
        fs::write(k8s.join("notes.txt"), "notes").unwrap();

        let nested = dir.path().join("k8s").join("overlays").join("prod");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("patch.yml"), "kind: Pod").unwrap();

        let hidden = dir.path().join(".terraform");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("module.tf"), "").unwrap();

        fs::create_dir_all(dir.path().join("empty")).unwrap();

        dir
    }

    fn all_files(groups: &[DirectoryFiles]) -> Vec<PathBuf> {
        groups.iter().flat_map(|g| g.files.clone()).collect()
    }

    #[test]
    fn test_walk_groups_by_directory() {
        let dir = create_test_dir();
        let walker = DirectoryWalker::new(WalkConfig::new());
        let groups = walker.walk(dir.path());

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].directory, dir.path());
        assert_eq!(groups[0].files, vec![dir.path().join("main.tf")]);
        assert_eq!(groups[1].directory, dir.path().join("k8s"));
        assert_eq!(groups[1].files, vec![dir.path().join("k8s/pod.yaml")]);
    }

    #[test]
    fn test_walk_skips_unrecognized_and_hidden() {
        let dir = create_test_dir();
        let walker = DirectoryWalker::new(WalkConfig::new());
        let files = all_files(&walker.walk(dir.path()));

        assert_eq!(files.len(), 3);
        assert!(!files.iter().any(|f| f.ends_with("README.md")));
        assert!(!files.iter().any(|f| f.ends_with("notes.txt")));
        assert!(!files.iter().any(|f| f.ends_with(".hidden.yaml")));
        assert!(!files.iter().any(|f| f.ends_with("module.tf")));
    }

    #[test]
    fn test_walk_with_max_depth() {
        let dir = create_test_dir();

        let root_only = DirectoryWalker::new(WalkConfig::new().with_max_depth(0));
        assert_eq!(all_files(&root_only.walk(dir.path())).len(), 1);

        let one_level = DirectoryWalker::new(WalkConfig::new().with_max_depth(1));
        assert_eq!(all_files(&one_level.walk(dir.path())).len(), 2);
    }

    #[test]
    fn test_walk_with_exclude() {
        let dir = create_test_dir();
        let config = WalkConfig::new().with_exclude(ExcludeList::new(["k8s/overlays"]));
        let files = all_files(&DirectoryWalker::new(config).walk(dir.path()));

        assert_eq!(files.len(), 2);
        assert!(!files.iter().any(|f| f.ends_with("patch.yml")));
    }

    #[test]
    fn test_walk_empty_directory() {
        let dir = TempDir::new().unwrap();
        let walker = DirectoryWalker::new(WalkConfig::new());
        assert!(walker.walk(dir.path()).is_empty());
    }
}
