//! Typed access to the Geoclue location service
//!
//! This crate describes the service's bus interfaces as Rust types and hides
//! the bus behind the [`GeoclueBus`] trait. [`DbusClient`] is the production
//! implementation; anything else implementing the trait (an in-memory fake in
//! tests, for instance) can stand in for it.
//!
//! # Example
//!
//! ```no_run
//! use geoclue_api::{DbusClient, GeoclueBus, Requirements, AccuracyLevel, ResourceFlags};
//!
//! let client = DbusClient::session()?;
//! let session = client.create_session()?;
//! client.set_requirements(
//!     &session,
//!     &Requirements::new(AccuracyLevel::Locality, ResourceFlags::ALL),
//! )?;
//! client.position_start(&session)?;
//!
//! let position = client.get_position(&session)?;
//! println!("{:.4}, {:.4}", position.latitude, position.longitude);
//! # Ok::<(), geoclue_api::ApiError>(())
//! ```
//!
//! # Timeouts
//!
//! Every call made by [`DbusClient`] is bounded by
//! [`ClientConfig::call_timeout`] and fails with [`ApiError::Timeout`] when
//! the remote side does not answer in time.

pub mod bus;
pub mod client;
pub mod error;
pub mod interface;
pub mod model;
mod proxies;

pub use bus::{BusEvent, EventPayload, GeoclueBus, Notification, Subscription};
pub use client::{BusKind, ClientConfig, DbusClient};
pub use error::{ApiError, Result};
pub use interface::{Interface, MASTER_PATH, MASTER_SERVICE};
pub use model::{
    Accuracy, AccuracyLevel, Address, AddressUpdate, CanonicalAddress, Endpoint, ManualProvider,
    PositionFields, PositionUpdate, ProviderChange, ProviderInfo, ProviderStatus, Requirements,
    ResourceFlags,
};
