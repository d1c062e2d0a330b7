//! Name and path patterns deciding which entries the loader skips.

use std::path::{Component, Path, PathBuf};

/// Whether a file or directory name is skipped the same way Terraform skips it:
/// hidden entries, editor swap and backup files, and emacs lock files.
pub fn is_ignorable_name(name: &str) -> bool {
    name.starts_with('.')
        || name.starts_with('~')
        || name.ends_with('~')
        || (name.len() > 1 && name.starts_with('#') && name.ends_with('#'))
}

/// Whether the last component of `path` is ignorable.
pub fn is_ignorable_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_ignorable_name)
}

/// Paths excluded from a directory scan, relative to the scan root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeList {
    entries: Vec<PathBuf>,
}

impl ExcludeList {
    pub fn new(entries: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .flat_map(|entry| {
                    entry
                        .as_ref()
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(normalize)
                        .collect::<Vec<_>>()
                })
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `path` (under `root`) equals an entry or lies beneath one.
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        let relative = normalize_path(relative);
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.entries.iter().any(|entry| relative.starts_with(entry))
    }
}

fn normalize(entry: &str) -> PathBuf {
    normalize_path(Path::new(entry))
}

fn normalize_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignorable_names() {
        assert!(is_ignorable_name(".terraform"));
        assert!(is_ignorable_name(".hidden.tf"));
        assert!(is_ignorable_name("~main.tf"));
        assert!(is_ignorable_name("main.tf~"));
        assert!(is_ignorable_name("#main.tf#"));
        assert!(!is_ignorable_name("#"));
        assert!(!is_ignorable_name("main.tf"));
        assert!(!is_ignorable_name("deploy#1.yaml"));
    }

    #[test]
    fn test_ignorable_path() {
        assert!(is_ignorable_path(Path::new("infra/.main.tf")));
        assert!(!is_ignorable_path(Path::new(".config/main.tf")));
    }

    #[test]
    fn test_exclude_exact_and_nested() {
        let root = Path::new("/repo");
        let exclude = ExcludeList::new(["modules/legacy", "./test.tf"]);

        assert!(exclude.is_excluded(root, Path::new("/repo/modules/legacy")));
        assert!(exclude.is_excluded(root, Path::new("/repo/modules/legacy/main.tf")));
        assert!(exclude.is_excluded(root, Path::new("/repo/test.tf")));
        assert!(!exclude.is_excluded(root, Path::new("/repo/modules/legacy2/main.tf")));
        assert!(!exclude.is_excluded(root, Path::new("/repo/modules")));
        assert!(!exclude.is_excluded(root, root));
    }

    #[test]
    fn test_exclude_comma_separated() {
        let exclude = ExcludeList::new(["a, b/c ,"]);
        let root = Path::new("/r");
        assert!(exclude.is_excluded(root, Path::new("/r/a/x.yaml")));
        assert!(exclude.is_excluded(root, Path::new("/r/b/c")));
        assert!(!exclude.is_excluded(root, Path::new("/r/b")));
    }

    #[test]
    fn test_empty_exclude_list() {
        let exclude = ExcludeList::default();
        assert!(exclude.is_empty());
        assert!(!exclude.is_excluded(Path::new("/r"), Path::new("/r/a")));
    }
}
