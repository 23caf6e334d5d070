//! Filesystem-based source provider.
//!
//! Every `load` goes back to disk; nothing is cached here. Relative locations
//! are resolved against the provider's base directory.

use clause_traits::{SharedSourceData, SourceError, SourceProvider};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DOCUMENT_EXTENSION: &str = "xml";

#[derive(Debug)]
pub struct FilesystemSourceProvider {
    base_path: PathBuf,
}

impl FilesystemSourceProvider {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// A provider rooted at the process working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        let path = Path::new(locator);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn is_document(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
    }

    fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), SourceError> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::walk(&path, found)?;
            } else if Self::is_document(&path) {
                found.push(path);
            }
        }
        Ok(())
    }
}

impl SourceProvider for FilesystemSourceProvider {
    fn load(&self, locator: &str) -> Result<SharedSourceData, SourceError> {
        let path = self.resolve(locator);
        fs::read(&path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(locator.to_string())
            } else {
                SourceError::LoadFailed {
                    locator: locator.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn discover(&self, location: &str) -> Result<Vec<String>, SourceError> {
        let root = self.resolve(location);
        if root.is_file() {
            return Ok(vec![root.to_string_lossy().into_owned()]);
        }
        if !root.is_dir() {
            return Err(SourceError::NotFound(location.to_string()));
        }

        let mut found = Vec::new();
        Self::walk(&root, &mut found)?;
        found.sort();
        debug!(
            "Discovered {} document(s) under '{}'",
            found.len(),
            root.display()
        );
        Ok(found
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect())
    }

    fn exists(&self, locator: &str) -> bool {
        self.resolve(locator).is_file()
    }

    fn name(&self) -> &'static str {
        "FilesystemSourceProvider"
    }
}
