//! Test helpers for descriptor directory fixtures

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary providers directory populated with descriptor files
pub struct ProviderDir {
    dir: TempDir,
}

impl ProviderDir {
    /// Create an empty providers directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Directory path to hand to the loader
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a well-formed descriptor
    pub fn add_provider(&self, file: &str, name: &str, interfaces: &[&str]) -> PathBuf {
        let short = name.replace(' ', "");
        let content = format!(
            "[Geoclue Provider]\n\
             Name={name}\n\
             Service=org.freedesktop.Geoclue.Providers.{short}\n\
             Path=/org/freedesktop/Geoclue/Providers/{short}\n\
             Interfaces={}\n",
            interfaces.join(";")
        );
        self.add_raw(file, &content)
    }

    /// Write arbitrary file content
    pub fn add_raw(&self, file: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(file);
        fs::write(&path, content).expect("write fixture");
        path
    }
}
