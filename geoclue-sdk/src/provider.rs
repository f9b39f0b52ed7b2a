use std::path::PathBuf;

use geoclue_api::Endpoint;
use geoclue_providers::{Capabilities, ProviderDescriptor};
use serde::Serialize;

/// An installed provider and what it can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableProvider {
    pub name: String,
    pub service: String,
    pub path: String,
    pub address: bool,
    pub position: bool,
    pub geocoding: bool,
    pub reverse_geocoding: bool,
    /// Descriptor file the entry was read from
    pub descriptor: Option<PathBuf>,
}

impl AvailableProvider {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.service.clone(), self.path.clone())
    }
}

impl From<&ProviderDescriptor> for AvailableProvider {
    fn from(descriptor: &ProviderDescriptor) -> Self {
        let caps = descriptor.capabilities;
        Self {
            name: descriptor.name.clone(),
            service: descriptor.service.clone(),
            path: descriptor.path.clone(),
            address: caps.contains(Capabilities::ADDRESS),
            position: caps.contains(Capabilities::POSITION),
            geocoding: caps.contains(Capabilities::GEOCODE),
            reverse_geocoding: caps.contains(Capabilities::REVERSE_GEOCODE),
            descriptor: descriptor.file.clone(),
        }
    }
}

/// Human-readable name of a single capability, for error messages
pub(crate) fn capability_name(caps: Capabilities) -> &'static str {
    if caps == Capabilities::ADDRESS {
        "address"
    } else if caps == Capabilities::POSITION {
        "position"
    } else if caps == Capabilities::GEOCODE {
        "geocode"
    } else if caps == Capabilities::REVERSE_GEOCODE {
        "reverse-geocode"
    } else {
        "any"
    }
}
