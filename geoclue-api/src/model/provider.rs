use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use geoclue_providers::ProviderDescriptor;

use super::AccuracyLevel;

bitflags! {
    /// Resources a provider is allowed to use
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ResourceFlags: u32 {
        const NETWORK = 1 << 0;
        const CELL = 1 << 1;
        const GPS = 1 << 2;
        const ALL = (1 << 10) - 1;
    }
}

impl Default for ResourceFlags {
    fn default() -> Self {
        ResourceFlags::ALL
    }
}

/// Status reported by a provider's `GetStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderStatus {
    Error,
    Unavailable,
    Acquiring,
    Available,
}

impl ProviderStatus {
    /// Unknown codes are reported as `Error`
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => ProviderStatus::Unavailable,
            2 => ProviderStatus::Acquiring,
            3 => ProviderStatus::Available,
            _ => ProviderStatus::Error,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ProviderStatus::Available)
    }
}

/// Name and description from a provider's `GetProviderInfo`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub description: String,
}

/// The provider the master reports as active for a session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderChange {
    pub name: String,
    pub description: String,
    pub service: String,
    pub path: String,
}

impl ProviderChange {
    pub fn from_wire((name, description, service, path): (String, String, String, String)) -> Self {
        Self {
            name,
            description,
            service,
            path,
        }
    }

    /// Master sends empty strings when no provider satisfies the requirements
    pub fn is_none(&self) -> bool {
        self.name.is_empty() && self.service.is_empty()
    }
}

/// Requirements handed to the master's `SetRequirements`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub accuracy: AccuracyLevel,
    /// Minimum seconds between updates
    pub min_time: i32,
    pub require_updates: bool,
    pub resources: ResourceFlags,
}

impl Requirements {
    /// Requirements with no update throttling and updates required
    pub fn new(accuracy: AccuracyLevel, resources: ResourceFlags) -> Self {
        Self {
            accuracy,
            min_time: 0,
            require_updates: true,
            resources,
        }
    }
}

impl Default for Requirements {
    fn default() -> Self {
        Self::new(AccuracyLevel::None, ResourceFlags::ALL)
    }
}

/// A remote object: bus name plus object path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub service: String,
    pub path: String,
}

impl Endpoint {
    pub fn new(service: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
        }
    }

    /// A session object created by the master
    pub fn master_session(path: impl Into<String>) -> Self {
        Self::new(crate::MASTER_SERVICE, path)
    }
}

impl From<&ProviderDescriptor> for Endpoint {
    fn from(descriptor: &ProviderDescriptor) -> Self {
        Self::new(descriptor.service.clone(), descriptor.path.clone())
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.service, self.path)
    }
}

/// Providers that accept an address pushed by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManualProvider {
    /// `SetAddress(valid_until, fields)`
    Manual,
    /// `SetAddress(fields)`
    Localnet,
}

impl ManualProvider {
    /// Recognise the provider by its descriptor name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "manual" => Some(ManualProvider::Manual),
            "localnet" => Some(ManualProvider::Localnet),
            _ => None,
        }
    }
}
