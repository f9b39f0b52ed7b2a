//! Provider descriptor parsing.
//!
//! A descriptor is a small INI file installed by every provider:
//!
//! ```text
//! [Geoclue Provider]
//! Name=Gpsd
//! Service=org.freedesktop.Geoclue.Providers.Gpsd
//! Path=/org/freedesktop/Geoclue/Providers/Gpsd
//! Interfaces=org.freedesktop.Geoclue.Position;org.freedesktop.Geoclue.Velocity
//! ```
//!
//! Values are taken verbatim: no quote stripping, no escape processing.
//! Key names are matched without regard to case; the section name is exact.

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use ini::{Ini, ParseOption};

use crate::error::{DescriptorError, Result};

/// Section holding the provider keys
pub const PROVIDER_SECTION: &str = "Geoclue Provider";

/// Flat key lookup only: backslashes and quotes are part of the value
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Interface name advertising address support
pub const ADDRESS_INTERFACE: &str = "org.freedesktop.Geoclue.Address";
/// Interface name advertising position support
pub const POSITION_INTERFACE: &str = "org.freedesktop.Geoclue.Position";
/// Interface name advertising geocoding support
pub const GEOCODE_INTERFACE: &str = "org.freedesktop.Geoclue.Geocode";
/// Interface name advertising reverse geocoding support
pub const REVERSE_GEOCODE_INTERFACE: &str = "org.freedesktop.Geoclue.ReverseGeocode";

bitflags! {
    /// Interfaces a provider implements.
    ///
    /// Bit values match the service's own interface flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const ADDRESS = 1 << 0;
        const POSITION = 1 << 1;
        const GEOCODE = 1 << 2;
        const REVERSE_GEOCODE = 1 << 3;
    }
}

impl Capabilities {
    /// Map one fully-qualified interface name to its capability bit.
    ///
    /// Returns `None` for interfaces that carry no capability (e.g. Velocity).
    pub fn from_interface(name: &str) -> Option<Self> {
        match name {
            ADDRESS_INTERFACE => Some(Capabilities::ADDRESS),
            POSITION_INTERFACE => Some(Capabilities::POSITION),
            GEOCODE_INTERFACE => Some(Capabilities::GEOCODE),
            REVERSE_GEOCODE_INTERFACE => Some(Capabilities::REVERSE_GEOCODE),
            _ => None,
        }
    }

    /// Parse a semicolon-separated `Interfaces` value.
    ///
    /// Tokens are trimmed; empty and unknown tokens are ignored.
    pub fn from_interface_list(list: &str) -> Self {
        list.split(';')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(Self::from_interface)
            .fold(Capabilities::empty(), |acc, cap| acc | cap)
    }
}

/// One installed provider, as described by its descriptor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Human readable provider name, e.g. "Gpsd" or "Geonames Provider"
    pub name: String,
    /// Well-known bus name the provider owns
    pub service: String,
    /// Object path of the provider object
    pub path: String,
    /// Interfaces the provider implements
    pub capabilities: Capabilities,
    /// File the descriptor was loaded from, if any
    pub file: Option<PathBuf>,
}

impl ProviderDescriptor {
    /// Load a descriptor from a `.provider` file.
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError::Io` if the file cannot be read,
    /// `DescriptorError::Parse` for invalid INI, and `MissingSection` /
    /// `MissingKey` when required entries are absent.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|e| match e {
            ini::Error::Io(source) => DescriptorError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(err) => DescriptorError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;

        let mut descriptor = Self::from_ini(&ini, path)?;
        descriptor.file = Some(path.to_path_buf());
        Ok(descriptor)
    }

    /// Parse descriptor text. `origin` is only used in error messages.
    pub fn from_ini_str(content: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let origin = origin.as_ref();
        let ini = Ini::load_from_str_opt(content, parse_option()).map_err(|e| {
            DescriptorError::Parse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        Self::from_ini(&ini, origin)
    }

    fn from_ini(ini: &Ini, origin: &Path) -> Result<Self> {
        let section = ini
            .section(Some(PROVIDER_SECTION))
            .ok_or_else(|| DescriptorError::MissingSection {
                path: origin.to_path_buf(),
                section: PROVIDER_SECTION,
            })?;

        let required = |key: &'static str| -> Result<String> {
            section
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value.to_string())
                .ok_or_else(|| DescriptorError::MissingKey {
                    path: origin.to_path_buf(),
                    key,
                })
        };

        Ok(Self {
            name: required("Name")?,
            path: required("Path")?,
            service: required("Service")?,
            capabilities: Capabilities::from_interface_list(&required("Interfaces")?),
            file: None,
        })
    }

    /// Check whether the provider implements every capability in `caps`.
    pub fn supports(&self, caps: Capabilities) -> bool {
        self.capabilities.contains(caps)
    }

    /// Case-insensitive name comparison.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
