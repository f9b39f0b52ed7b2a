//! Geoclue provider descriptor loading
//!
//! Every installed Geoclue provider ships a small `.provider` INI file
//! describing its bus name, object path and the interfaces it implements.
//! This crate scans a directory of such files and turns them into
//! [`ProviderDescriptor`] values.
//!
//! # Quick Start
//!
//! ```no_run
//! use geoclue_providers::{load, Capabilities, DEFAULT_PROVIDERS_PATH};
//!
//! let providers = load(DEFAULT_PROVIDERS_PATH)?;
//! for provider in providers.iter().filter(|p| p.supports(Capabilities::POSITION)) {
//!     println!("{} at {}", provider.name, provider.service);
//! }
//! # Ok::<(), geoclue_providers::DescriptorError>(())
//! ```
//!
//! # Malformed Files
//!
//! [`load`] skips descriptors that fail to parse and logs a warning for each;
//! [`load_strict`] stops at the first one. A missing or unreadable directory
//! is an error for both.

mod error;
pub mod descriptor;
mod loader;

pub use descriptor::{
    Capabilities, ProviderDescriptor, ADDRESS_INTERFACE, GEOCODE_INTERFACE, POSITION_INTERFACE,
    PROVIDER_SECTION, REVERSE_GEOCODE_INTERFACE,
};
pub use error::{DescriptorError, Result};
pub use loader::{DescriptorIterator, PROVIDER_EXTENSION};

use std::path::Path;

/// Directory the service installs descriptors into
pub const DEFAULT_PROVIDERS_PATH: &str = "/usr/share/geoclue-providers";

/// Load every readable descriptor in `dir`, skipping malformed files.
///
/// # Errors
///
/// Returns `DescriptorError::DirectoryUnreadable` if `dir` cannot be listed.
pub fn load(dir: impl AsRef<Path>) -> Result<Vec<ProviderDescriptor>> {
    let descriptors = load_iter(dir)?
        .filter_map(|result| match result {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                tracing::warn!("Skipping provider descriptor: {}", e);
                None
            }
        })
        .collect();

    Ok(descriptors)
}

/// Load every descriptor in `dir`, failing on the first malformed file.
pub fn load_strict(dir: impl AsRef<Path>) -> Result<Vec<ProviderDescriptor>> {
    load_iter(dir)?.collect()
}

/// Get an iterator yielding one parse result per descriptor file in `dir`.
pub fn load_iter(dir: impl AsRef<Path>) -> Result<DescriptorIterator> {
    DescriptorIterator::new(dir)
}

/// Find a descriptor by case-insensitive name that offers `caps`.
pub fn find<'a>(
    descriptors: &'a [ProviderDescriptor],
    name: &str,
    caps: Capabilities,
) -> Option<&'a ProviderDescriptor> {
    descriptors
        .iter()
        .find(|d| d.matches_name(name) && d.supports(caps))
}
