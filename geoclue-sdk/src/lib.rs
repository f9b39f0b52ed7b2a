//! # Geoclue SDK - location for desktop applications
//!
//! A synchronous facade over the Geoclue location service:
//!
//! ```rust,no_run
//! use geoclue_sdk::{GeoclueSystem, LocationConfig};
//!
//! fn main() -> Result<(), geoclue_sdk::SdkError> {
//!     let config = LocationConfig::from_env()?;
//!     let system = GeoclueSystem::with_config(config.clone())?;
//!     system.initialize(config.accuracy, config.resources)?;
//!
//!     let location = system.get_location_info();
//!     if let Some((lat, lon)) = location.coordinates() {
//!         println!("{:.4}, {:.4}", lat, lon);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! geoclue-sdk (GeoclueSystem, snapshot, subscribers)
//!     ↓
//! geoclue-api (GeoclueBus, DbusClient)      signal (dispatcher)
//!     ↓
//! geoclue-providers (descriptor files)
//! ```
//!
//! Bus notifications are queued to an event thread which swaps in a new
//! [`LocationSnapshot`]. Every new snapshot, including those made by
//! `initialize` and provider switches, is handed to a single notifier thread
//! that calls every subscriber in order.

pub mod address;
pub mod config;
mod dispatch;
pub mod error;
pub mod geo;
pub mod logging;
pub mod provider;
pub mod snapshot;
pub mod system;

pub use address::{validate_address, validate_address_map};
pub use config::LocationConfig;
pub use error::{ErrorKind, Result, SdkError};
pub use provider::AvailableProvider;
pub use snapshot::LocationSnapshot;
pub use system::{Bindings, GeoclueSystem, SessionStatus, REVERSE_GEOCODER};

// Re-exported so callers need only this crate
pub use geoclue_api::{
    Accuracy, AccuracyLevel, Address, BusKind, CanonicalAddress, Endpoint, GeoclueBus,
    PositionFields, PositionUpdate, ProviderInfo, ProviderStatus, Requirements, ResourceFlags,
};
pub use geoclue_providers::{Capabilities, ProviderDescriptor};
pub use signal::SubscriptionId;
