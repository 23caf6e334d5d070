//! SourceProvider trait for abstracting where condition documents come from.
//!
//! The resolvers only ever see locator strings; turning a locator into bytes,
//! and a configured location into the locators beneath it, is the provider's
//! job.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for source loading operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Failed to load source '{locator}': {message}")]
    LoadFailed { locator: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

/// Shared document bytes.
pub type SharedSourceData = Arc<Vec<u8>>;

/// Loads condition documents and enumerates the documents under a location.
///
/// # Implementations
///
/// - `FilesystemSourceProvider` (clause-resource): reads from disk on every
///   `load`, so edits are picked up without a restart
/// - [`InMemorySourceProvider`]: pre-populated map, for tests and embedding
pub trait SourceProvider: Send + Sync + Debug {
    /// Reads the full contents of the document behind `locator`.
    fn load(&self, locator: &str) -> Result<SharedSourceData, SourceError>;

    /// Lists the `.xml` document locators found under `location`, sorted.
    ///
    /// A location naming a single document yields just that document.
    fn discover(&self, location: &str) -> Result<Vec<String>, SourceError>;

    fn exists(&self, locator: &str) -> bool;

    /// Human-readable provider name for logs.
    fn name(&self) -> &'static str;
}

/// An in-memory source provider. Locators are `/`-separated keys.
#[derive(Debug, Default)]
pub struct InMemorySourceProvider {
    sources: RwLock<BTreeMap<String, SharedSourceData>>,
}

impl InMemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a document.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::LoadFailed` if the internal lock is poisoned.
    pub fn insert(&self, locator: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<(), SourceError> {
        let locator = locator.into();
        let mut sources = self.sources.write().map_err(|_| SourceError::LoadFailed {
            locator: locator.clone(),
            message: "source store lock poisoned".to_string(),
        })?;
        sources.insert(locator, Arc::new(data.into()));
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert) for fixtures.
    pub fn with_source(self, locator: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<Self, SourceError> {
        self.insert(locator, data)?;
        Ok(self)
    }

    pub fn remove(&self, locator: &str) -> Option<SharedSourceData> {
        self.sources.write().ok()?.remove(locator)
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.sources.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SourceProvider for InMemorySourceProvider {
    fn load(&self, locator: &str) -> Result<SharedSourceData, SourceError> {
        let sources = self.sources.read().map_err(|_| SourceError::LoadFailed {
            locator: locator.to_string(),
            message: "source store lock poisoned".to_string(),
        })?;
        sources
            .get(locator)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(locator.to_string()))
    }

    fn discover(&self, location: &str) -> Result<Vec<String>, SourceError> {
        let sources = self.sources.read().map_err(|_| SourceError::LoadFailed {
            locator: location.to_string(),
            message: "source store lock poisoned".to_string(),
        })?;
        let location = location.trim_end_matches('/');
        let prefix = format!("{}/", location);
        let found: Vec<String> = sources
            .keys()
            .filter(|key| key.as_str() == location || key.starts_with(&prefix))
            .filter(|key| key.ends_with(".xml"))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(SourceError::NotFound(location.to_string()));
        }
        Ok(found)
    }

    fn exists(&self, locator: &str) -> bool {
        self.sources
            .read()
            .map(|s| s.contains_key(locator))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemorySourceProvider"
    }
}
