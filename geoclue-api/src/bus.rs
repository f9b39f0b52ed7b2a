//! The seam between the location facade and the bus
//!
//! [`GeoclueBus`] lists every remote call the facade makes. [`crate::DbusClient`]
//! implements it over a real connection; tests substitute an in-memory fake.

use std::fmt;
use std::sync::mpsc;

use crate::error::Result;
use crate::model::{
    Accuracy, Address, AddressUpdate, CanonicalAddress, Endpoint, ManualProvider, PositionUpdate,
    ProviderChange, ProviderInfo, ProviderStatus, Requirements,
};

/// Change notifications a caller can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// `AddressChanged` on an address object
    AddressChanged,
    /// `PositionChanged` on a position object
    PositionChanged,
    /// `AddressProviderChanged` on a master session
    AddressProviderChanged,
    /// `PositionProviderChanged` on a master session
    PositionProviderChanged,
}

impl Notification {
    /// Bus member name of the signal
    pub fn member(&self) -> &'static str {
        match self {
            Notification::AddressChanged => "AddressChanged",
            Notification::PositionChanged => "PositionChanged",
            Notification::AddressProviderChanged => "AddressProviderChanged",
            Notification::PositionProviderChanged => "PositionProviderChanged",
        }
    }
}

/// Decoded payload of a notification
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Address(AddressUpdate),
    Position(PositionUpdate),
    AddressProvider(ProviderChange),
    PositionProvider(ProviderChange),
}

/// A notification together with the object that emitted it
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    pub source: Endpoint,
    pub payload: EventPayload,
}

impl BusEvent {
    pub fn new(source: Endpoint, payload: EventPayload) -> Self {
        Self { source, payload }
    }
}

/// Live notification subscription; dropping it stops delivery
pub struct Subscription {
    description: String,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(description: impl Into<String>, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            description: description.into(),
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stop delivery now rather than at drop
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            tracing::debug!("Cancelling subscription {}", self.description);
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("description", &self.description)
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Remote operations against the location service
///
/// All calls are blocking and return once the remote side replied or the
/// implementation's timeout expired.
pub trait GeoclueBus: Send + Sync {
    /// `Master.Create`: open a client session
    fn create_session(&self) -> Result<Endpoint>;

    /// `MasterClient.AddressStart`
    fn address_start(&self, session: &Endpoint) -> Result<()>;

    /// `MasterClient.PositionStart`
    fn position_start(&self, session: &Endpoint) -> Result<()>;

    /// `MasterClient.SetRequirements`
    fn set_requirements(&self, session: &Endpoint, requirements: &Requirements) -> Result<()>;

    /// `MasterClient.GetAddressProvider`
    fn address_provider(&self, session: &Endpoint) -> Result<ProviderChange>;

    /// `MasterClient.GetPositionProvider`
    fn position_provider(&self, session: &Endpoint) -> Result<ProviderChange>;

    /// `Address.GetAddress`
    fn get_address(&self, endpoint: &Endpoint) -> Result<AddressUpdate>;

    /// `Position.GetPosition`
    fn get_position(&self, endpoint: &Endpoint) -> Result<PositionUpdate>;

    /// `Manual.SetAddress` or `Localnet.SetAddress`
    fn set_address(
        &self,
        endpoint: &Endpoint,
        provider: ManualProvider,
        address: &CanonicalAddress,
    ) -> Result<()>;

    /// `Geoclue.GetStatus`
    fn status(&self, endpoint: &Endpoint) -> Result<ProviderStatus>;

    /// `Geoclue.GetProviderInfo`
    fn provider_info(&self, endpoint: &Endpoint) -> Result<ProviderInfo>;

    /// `ReverseGeocode.PositionToAddress`
    fn position_to_address(
        &self,
        endpoint: &Endpoint,
        latitude: f64,
        longitude: f64,
        accuracy: &Accuracy,
    ) -> Result<Vec<Address>>;

    /// Forward `notification` from `endpoint` into `sink` until the returned
    /// guard is dropped
    fn subscribe(
        &self,
        endpoint: &Endpoint,
        notification: Notification,
        sink: mpsc::Sender<BusEvent>,
    ) -> Result<Subscription>;
}
