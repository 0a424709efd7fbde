//! Template catalogs — explicit directory listings for auto-discovered plans.
//!
//! The resolver never touches the file system. Scenarios whose script list
//! is discovered rather than fixed ask a `ScriptCatalog` for the files of one
//! subdirectory. The listing contract is:
//!
//! - only regular files directly inside the subdirectory (no recursion)
//! - plain file names, not paths
//! - sorted lexicographically by file name, independent of file system order

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{DcrError, Result};

/// Source of script listings for auto-discovered plans
pub trait ScriptCatalog {
    /// List script file names in `subdirectory`, sorted by name.
    fn list(&self, subdirectory: &str) -> Result<Vec<String>>;
}

/// Catalog backed by the template directory tree
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ScriptCatalog for DirectoryCatalog {
    fn list(&self, subdirectory: &str) -> Result<Vec<String>> {
        let dir = self.root.join(subdirectory);
        if !dir.is_dir() {
            return Err(DcrError::TemplateNotFound { path: dir });
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| DcrError::Io(e.into()))?;
            if entry.file_type().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // sort_by_file_name compares OsStr; re-sort on the UTF-8 names we return
        names.sort();

        debug!("Discovered {} scripts in {}", names.len(), dir.display());
        Ok(names)
    }
}

/// In-memory catalog, for callers that already hold a listing
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    dirs: BTreeMap<String, Vec<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the files of one subdirectory
    pub fn with_dir<I, S>(mut self, subdirectory: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs
            .insert(subdirectory.into(), files.into_iter().map(Into::into).collect());
        self
    }
}

impl ScriptCatalog for StaticCatalog {
    fn list(&self, subdirectory: &str) -> Result<Vec<String>> {
        let mut names = self
            .dirs
            .get(subdirectory)
            .cloned()
            .ok_or_else(|| DcrError::TemplateNotFound {
                path: PathBuf::from(subdirectory),
            })?;
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directory_catalog_sorts_and_skips_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        let provider = root.path().join("provider");
        fs::create_dir_all(provider.join("nested")).unwrap();
        for name in ["03_grants.sql", "01_init.sql", "02_tables.sql"] {
            fs::write(provider.join(name), "select 1;\n").unwrap();
        }
        fs::write(provider.join("nested").join("00_hidden.sql"), "").unwrap();

        let catalog = DirectoryCatalog::new(root.path());
        let names = catalog.list("provider").unwrap();
        assert_eq!(names, vec!["01_init.sql", "02_tables.sql", "03_grants.sql"]);
    }

    #[test]
    fn test_directory_catalog_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let catalog = DirectoryCatalog::new(root.path());
        let err = catalog.list("consumer").unwrap_err();
        assert!(matches!(err, DcrError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_static_catalog_sorts() {
        let catalog = StaticCatalog::new().with_dir("consumer", ["b.sql", "a.sql"]);
        assert_eq!(catalog.list("consumer").unwrap(), vec!["a.sql", "b.sql"]);
        assert!(catalog.list("provider").is_err());
    }
}
