//! Directory scanning and the descriptor iterator.
//!
//! The scan:
//! 1. Lists the providers directory (failure is fatal)
//! 2. Keeps regular files with the `.provider` extension
//! 3. Sorts them by file name so results are stable across runs
//! 4. Parses each file lazily as the iterator advances

use std::fs;
use std::path::{Path, PathBuf};

use crate::descriptor::ProviderDescriptor;
use crate::error::{DescriptorError, Result};

/// File extension marking a provider descriptor
pub const PROVIDER_EXTENSION: &str = "provider";

/// Iterator yielding one parse result per descriptor file.
///
/// # Examples
///
/// ```no_run
/// use geoclue_providers::load_iter;
///
/// for result in load_iter("/usr/share/geoclue-providers")? {
///     match result {
///         Ok(descriptor) => println!("Found: {}", descriptor.name),
///         Err(e) => eprintln!("Skipping: {}", e),
///     }
/// }
/// # Ok::<(), geoclue_providers::DescriptorError>(())
/// ```
#[derive(Debug)]
pub struct DescriptorIterator {
    files: std::vec::IntoIter<PathBuf>,
}

impl DescriptorIterator {
    /// List `dir` and prepare to parse every descriptor in it
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let unreadable = |source| DescriptorError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_file() && is_descriptor_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        tracing::debug!(
            "Found {} provider descriptor(s) in {}",
            files.len(),
            dir.display()
        );

        Ok(Self {
            files: files.into_iter(),
        })
    }

    /// Number of descriptor files not yet parsed
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl Iterator for DescriptorIterator {
    type Item = Result<ProviderDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(ProviderDescriptor::from_file(&path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

fn is_descriptor_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == PROVIDER_EXTENSION)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_descriptor_file() {
        assert!(is_descriptor_file(Path::new("/usr/share/geoclue-providers/geoclue-gpsd.provider")));
        assert!(!is_descriptor_file(Path::new("geoclue-gpsd.provider.bak")));
        assert!(!is_descriptor_file(Path::new("README")));
        assert!(!is_descriptor_file(Path::new(".provider")));
    }

    #[test]
    fn test_missing_directory_is_error() {
        let err = DescriptorIterator::new("/definitely/not/a/providers/dir").unwrap_err();
        assert!(matches!(err, DescriptorError::DirectoryUnreadable { .. }));
    }
}
