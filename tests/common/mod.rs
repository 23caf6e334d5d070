pub mod fixtures;

use clause::{Config, FilesystemSourceProvider};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A temporary directory of condition documents.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self, std::io::Error> {
        init_logging();
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Result<(), std::io::Error> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn provider(&self) -> Arc<FilesystemSourceProvider> {
        Arc::new(FilesystemSourceProvider::new(self.dir.path()))
    }

    pub fn config(&self, debug: bool) -> Config {
        Config::default()
            .with_debug(debug)
            .with_xml_locations(["conditions"])
    }
}
