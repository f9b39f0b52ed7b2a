//! Error types for descriptor loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for provider descriptor operations.
///
/// Distinguishes a broken providers directory (fatal for a scan) from a
/// single broken descriptor file (which a lenient scan skips).
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The providers directory is missing or cannot be listed
    #[error("Cannot read providers directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor file could not be read
    #[error("Cannot read descriptor {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor file is not valid INI
    #[error("Parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// The `[Geoclue Provider]` section is absent
    #[error("{}: missing [{section}] section", .path.display())]
    MissingSection { path: PathBuf, section: &'static str },

    /// A required key is absent from the provider section
    #[error("{}: missing key '{key}'", .path.display())]
    MissingKey { path: PathBuf, key: &'static str },
}

impl DescriptorError {
    /// Path of the file or directory the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            DescriptorError::DirectoryUnreadable { path, .. }
            | DescriptorError::Io { path, .. }
            | DescriptorError::Parse { path, .. }
            | DescriptorError::MissingSection { path, .. }
            | DescriptorError::MissingKey { path, .. } => path,
        }
    }

    /// Whether the error concerns a single file rather than the directory
    pub fn is_per_file(&self) -> bool {
        !matches!(self, DescriptorError::DirectoryUnreadable { .. })
    }
}

/// Convenience Result type alias for descriptor operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;
