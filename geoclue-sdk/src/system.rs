//! GeoclueSystem - main entry point for the SDK
//!
//! Owns the location session, the last-known snapshot and the subscriber
//! list. Every method is synchronous.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use geoclue_api::{
    Accuracy, AccuracyLevel, Address, AddressUpdate, BusEvent, CanonicalAddress, DbusClient,
    Endpoint, EventPayload, GeoclueBus, ManualProvider, Notification, PositionUpdate,
    ProviderInfo, ProviderStatus, Requirements, ResourceFlags, Subscription,
};
use geoclue_providers::{Capabilities, ProviderDescriptor};
use signal::{Signal, SubscriptionId};

use crate::address::validate_address;
use crate::config::LocationConfig;
use crate::dispatch::{self, EventSink, NOTIFY_THREAD_NAME, PUMP_THREAD_NAME};
use crate::error::{Result, SdkError};
use crate::geo::{self, DEFAULT_PROXIMITY_KM};
use crate::provider::{capability_name, AvailableProvider};
use crate::snapshot::{LocationSnapshot, SnapshotCell};

/// Name of the provider used for reverse geocoding
pub const REVERSE_GEOCODER: &str = "Geonames Provider";

/// Lifecycle of the location session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// `initialize` has not succeeded yet
    Uninitialized,
    /// Session open, notifications flowing
    Active,
    /// `close` was called; terminal
    Closed,
}

/// Objects the session is currently bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    /// The session object created by the master
    pub session: Endpoint,
    /// Explicitly selected address provider, `None` while the master chooses
    pub address_provider: Option<String>,
    /// Explicitly selected position provider, `None` while the master chooses
    pub position_provider: Option<String>,
}

/// Location session facade
///
/// # Example
///
/// ```rust,no_run
/// use geoclue_sdk::{AccuracyLevel, GeoclueSystem, ResourceFlags};
///
/// fn main() -> Result<(), geoclue_sdk::SdkError> {
///     let system = GeoclueSystem::new()?;
///
///     system.connect(|snapshot| {
///         println!("Location changed: {:?}", snapshot.coordinates());
///     });
///
///     system.initialize(AccuracyLevel::Locality, ResourceFlags::ALL)?;
///
///     let location = system.get_location_info();
///     println!("Locality: {:?}", location.address.locality);
///
///     // Switch to GPS if it is installed
///     if system.set_position_provider("Gpsd").is_ok() {
///         println!("Using GPS");
///     }
///
///     Ok(())
/// }
/// ```
pub struct GeoclueSystem {
    inner: Arc<Inner>,
}

struct Inner {
    bus: Arc<dyn GeoclueBus>,
    descriptors: Vec<ProviderDescriptor>,
    snapshot: SnapshotCell,
    signal: Signal<LocationSnapshot>,
    state: Mutex<SessionState>,
}

enum SessionState {
    Uninitialized,
    Active(Session),
    Closed,
}

struct Session {
    endpoint: Endpoint,
    address: Binding,
    position: Binding,
    _provider_watch: Vec<Subscription>,
    events: Sender<BusEvent>,
    published: Sender<Arc<LocationSnapshot>>,
    workers: Vec<JoinHandle<()>>,
}

impl Session {
    /// Queue `snapshot` for the notifier
    ///
    /// Called with the state lock held, so queue order matches version order.
    fn publish(&self, snapshot: Arc<LocationSnapshot>) {
        if self.published.send(snapshot).is_err() {
            tracing::debug!("Notifier gone, snapshot not delivered");
        }
    }
}

/// A capability interface bound to a remote object
struct Binding {
    endpoint: Endpoint,
    provider: Option<String>,
    _subscription: Subscription,
}

impl Binding {
    fn label(&self) -> &str {
        self.provider.as_deref().unwrap_or("master")
    }
}

/// Which of the two bindings an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Address,
    Position,
}

impl Role {
    fn capability(self) -> Capabilities {
        match self {
            Role::Address => Capabilities::ADDRESS,
            Role::Position => Capabilities::POSITION,
        }
    }

    fn notification(self) -> Notification {
        match self {
            Role::Address => Notification::AddressChanged,
            Role::Position => Notification::PositionChanged,
        }
    }

    fn binding_mut(self, session: &mut Session) -> &mut Binding {
        match self {
            Role::Address => &mut session.address,
            Role::Position => &mut session.position,
        }
    }

    fn refresh(self, bus: &dyn GeoclueBus, endpoint: &Endpoint) -> geoclue_api::Result<Reading> {
        match self {
            Role::Address => bus.get_address(endpoint).map(Reading::Address),
            Role::Position => bus.get_position(endpoint).map(Reading::Position),
        }
    }
}

/// A fresh reading fetched from a provider
enum Reading {
    Address(AddressUpdate),
    Position(PositionUpdate),
}

impl Reading {
    fn apply(&self, snapshot: &LocationSnapshot) -> LocationSnapshot {
        match self {
            Reading::Address(update) => snapshot.with_address(update),
            Reading::Position(update) => snapshot.with_position(update),
        }
    }
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        match self {
            SessionState::Uninitialized => SessionStatus::Uninitialized,
            SessionState::Active(_) => SessionStatus::Active,
            SessionState::Closed => SessionStatus::Closed,
        }
    }

    fn active(&self) -> Result<&Session> {
        match self {
            SessionState::Active(session) => Ok(session),
            SessionState::Uninitialized => Err(SdkError::NotInitialized),
            SessionState::Closed => Err(SdkError::Closed),
        }
    }

    fn active_mut(&mut self) -> Result<&mut Session> {
        match self {
            SessionState::Active(session) => Ok(session),
            SessionState::Uninitialized => Err(SdkError::NotInitialized),
            SessionState::Closed => Err(SdkError::Closed),
        }
    }
}

impl GeoclueSystem {
    /// Connect to the session bus and load descriptors from the default directory
    pub fn new() -> Result<Self> {
        Self::with_config(LocationConfig::default())
    }

    /// Load descriptors from `config.providers_path` and connect to `config.bus`
    pub fn with_config(config: LocationConfig) -> Result<Self> {
        config.validate()?;
        let descriptors = load_descriptors(&config)?;
        let client = DbusClient::new(config.client_config()).map_err(SdkError::Session)?;
        Ok(Self::from_descriptors(descriptors, Arc::new(client)))
    }

    /// Load descriptors from `config.providers_path` and talk through `bus`
    pub fn with_bus(config: LocationConfig, bus: Arc<dyn GeoclueBus>) -> Result<Self> {
        config.validate()?;
        let descriptors = load_descriptors(&config)?;
        Ok(Self::from_descriptors(descriptors, bus))
    }

    /// Use an already loaded descriptor set
    pub fn from_descriptors(descriptors: Vec<ProviderDescriptor>, bus: Arc<dyn GeoclueBus>) -> Self {
        Self {
            inner: Arc::new(Inner {
                bus,
                descriptors,
                snapshot: SnapshotCell::default(),
                signal: Signal::new(),
                state: Mutex::new(SessionState::Uninitialized),
            }),
        }
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Open the session and seed the snapshot
    ///
    /// Creates a session with the master, subscribes to provider, address and
    /// position changes, starts both capability interfaces, hands over the
    /// requirements and fetches the current address and position. Subscribers
    /// are notified once per fetched reading, on the notifier thread.
    ///
    /// On failure the session stays uninitialized and `initialize` may be
    /// retried.
    pub fn initialize(&self, accuracy: AccuracyLevel, resources: ResourceFlags) -> Result<()> {
        let requirements = Requirements::new(accuracy, resources);

        let mut state = self.inner.lock_state();
        match &*state {
            SessionState::Active(_) => return Err(SdkError::AlreadyInitialized),
            SessionState::Closed => return Err(SdkError::Closed),
            SessionState::Uninitialized => {}
        }

        let (session, readings) = self.inner.open_session(&requirements).map_err(|e| {
            tracing::warn!("Location session initialization failed: {}", e);
            e
        })?;

        tracing::info!(
            "Location session {} active (accuracy {:?})",
            session.endpoint,
            accuracy
        );
        for reading in &readings {
            session.publish(self.inner.snapshot.update(|s| reading.apply(s)));
        }
        *state = SessionState::Active(session);
        Ok(())
    }

    /// Release the session
    ///
    /// Drops every remote subscription and stops the notification pump.
    /// Afterwards every session operation fails with [`SdkError::Closed`].
    /// Calling `close` again is a no-op.
    pub fn close(&self) {
        self.inner.close();
    }

    pub fn state(&self) -> SessionStatus {
        self.inner.lock_state().status()
    }

    /// Current bindings, if the session is active
    pub fn bindings(&self) -> Option<Bindings> {
        let state = self.inner.lock_state();
        let session = state.active().ok()?;
        Some(Bindings {
            session: session.endpoint.clone(),
            address_provider: session.address.provider.clone(),
            position_provider: session.position.provider.clone(),
        })
    }

    /// Replace the session's requirements
    pub fn set_requirements(&self, requirements: Requirements) -> Result<()> {
        let state = self.inner.lock_state();
        let session = state.active()?;
        self.inner
            .bus
            .set_requirements(&session.endpoint, &requirements)?;
        tracing::debug!("Requirements updated: {:?}", requirements);
        Ok(())
    }

    // ========================================================================
    // Provider selection
    // ========================================================================

    /// Bind position updates to the named provider
    ///
    /// The provider must offer position. The new binding is in effect before
    /// the first refresh; if that refresh fails, the previous binding is
    /// restored and the error returned.
    pub fn set_position_provider(&self, name: &str) -> Result<()> {
        let descriptor = self.find_provider(name, Role::Position.capability())?;
        self.inner.switch(Role::Position, descriptor, |_, _| Ok(()))
    }

    /// Bind address updates to the named provider
    ///
    /// `Manual` and `Localnet` need `address`, which is normalised and pushed
    /// to the provider before binding; without one the call fails with
    /// [`SdkError::AddressRequired`] and nothing changes. Other providers
    /// ignore `address`.
    pub fn set_address_provider(&self, name: &str, address: Option<&Address>) -> Result<()> {
        let descriptor = self.find_provider(name, Role::Address.capability())?;

        let push = match (ManualProvider::from_name(name), address) {
            (Some(_), None) => return Err(SdkError::AddressRequired(descriptor.name.clone())),
            (Some(kind), Some(address)) => Some((kind, validate_address(address))),
            (None, _) => None,
        };

        self.inner.switch(Role::Address, descriptor, |bus, endpoint| match &push {
            Some((kind, canonical)) => bus.set_address(endpoint, *kind, canonical),
            None => Ok(()),
        })
    }

    /// Name of the position provider the master reports as active
    pub fn get_position_provider(&self) -> Result<String> {
        let state = self.inner.lock_state();
        let session = state.active()?;
        Ok(self.inner.bus.position_provider(&session.endpoint)?.name)
    }

    /// Name of the address provider the master reports as active
    pub fn get_address_provider(&self) -> Result<String> {
        let state = self.inner.lock_state();
        let session = state.active()?;
        Ok(self.inner.bus.address_provider(&session.endpoint)?.name)
    }

    /// Every installed provider with its capabilities
    pub fn get_available_providers(&self) -> Vec<AvailableProvider> {
        self.inner
            .descriptors
            .iter()
            .map(AvailableProvider::from)
            .collect()
    }

    /// Status of the named provider
    pub fn provider_status(&self, name: &str) -> Result<ProviderStatus> {
        let descriptor = self.find_provider(name, Capabilities::empty())?;
        Ok(self.inner.bus.status(&Endpoint::from(descriptor))?)
    }

    /// Name and description the named provider reports about itself
    pub fn provider_info(&self, name: &str) -> Result<ProviderInfo> {
        let descriptor = self.find_provider(name, Capabilities::empty())?;
        Ok(self.inner.bus.provider_info(&Endpoint::from(descriptor))?)
    }

    fn find_provider(&self, name: &str, caps: Capabilities) -> Result<&ProviderDescriptor> {
        geoclue_providers::find(&self.inner.descriptors, name, caps).ok_or_else(|| {
            SdkError::ProviderNotFound {
                name: name.to_string(),
                capability: capability_name(caps),
            }
        })
    }

    // ========================================================================
    // Location queries
    // ========================================================================

    /// The last-known location
    pub fn get_location_info(&self) -> Arc<LocationSnapshot> {
        self.inner.snapshot.load()
    }

    /// Address at the given coordinates, or `None` if no reverse geocoder is
    /// installed or the lookup fails
    pub fn reverse_position(
        &self,
        latitude: f64,
        longitude: f64,
        accuracy: AccuracyLevel,
    ) -> Option<CanonicalAddress> {
        match self.try_reverse_position(latitude, longitude, accuracy) {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!("Reverse geocoding ({}, {}) failed: {}", latitude, longitude, e);
                None
            }
        }
    }

    /// Like [`reverse_position`](Self::reverse_position) but reports why it failed
    ///
    /// `Ok(None)` means the geocoder answered without any address.
    pub fn try_reverse_position(
        &self,
        latitude: f64,
        longitude: f64,
        accuracy: AccuracyLevel,
    ) -> Result<Option<CanonicalAddress>> {
        let descriptor = self.find_provider(REVERSE_GEOCODER, Capabilities::REVERSE_GEOCODE)?;
        let accuracy = Accuracy::new(accuracy, 0.0, 0.0);

        let addresses = self.inner.bus.position_to_address(
            &Endpoint::from(descriptor),
            latitude,
            longitude,
            &accuracy,
        )?;

        Ok(addresses.first().map(validate_address))
    }

    /// Whether the current position lies within `proximity_km` (default 0.5)
    /// of the given coordinates
    ///
    /// Returns `false` while no position is known. See [`geo`] for the
    /// approximation used.
    pub fn compare_position(&self, latitude: f64, longitude: f64, proximity_km: Option<f64>) -> bool {
        let proximity = proximity_km.unwrap_or(DEFAULT_PROXIMITY_KM);
        match self.get_location_info().coordinates() {
            Some((current_lat, current_lon)) => {
                geo::within_proximity(current_lat, current_lon, latitude, longitude, proximity)
            }
            None => false,
        }
    }

    // ========================================================================
    // Subscribers
    // ========================================================================

    /// Call `callback` with the new snapshot after every location change
    ///
    /// Callbacks run in subscription order on the SDK's notifier thread, one
    /// snapshot at a time and in version order. That includes changes made
    /// by `initialize` and the provider setters, so a callback may run after
    /// the call that caused it has returned.
    pub fn connect<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&LocationSnapshot) + Send + Sync + 'static,
    {
        self.inner.signal.connect(callback)
    }

    /// Remove a subscriber; `false` if the handle was not connected
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        self.inner.signal.disconnect(id)
    }

    pub fn disconnect_all(&self) {
        self.inner.signal.disconnect_all();
    }
}

impl Drop for GeoclueSystem {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl std::fmt::Debug for GeoclueSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoclueSystem")
            .field("providers", &self.inner.descriptors.len())
            .field("state", &self.state())
            .field("subscribers", &self.inner.signal.len())
            .finish()
    }
}

fn load_descriptors(config: &LocationConfig) -> Result<Vec<ProviderDescriptor>> {
    let descriptors = geoclue_providers::load(&config.providers_path)?;
    tracing::info!(
        "Loaded {} provider descriptors from {}",
        descriptors.len(),
        config.providers_path.display()
    );
    Ok(descriptors)
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the remote half of initialization
    fn open_session(self: &Arc<Self>, requirements: &Requirements) -> Result<(Session, [Reading; 2])> {
        let bus = self.bus.as_ref();
        let endpoint = bus.create_session().map_err(SdkError::Session)?;
        tracing::debug!("Created session {}", endpoint);

        let (published, queued) = mpsc::channel::<Arc<LocationSnapshot>>();
        let notifier = dispatch::spawn_worker(NOTIFY_THREAD_NAME, Arc::downgrade(self), queued)
            .map_err(SdkError::EventPump)?;
        let (events, receiver) = mpsc::channel::<BusEvent>();
        let pump = dispatch::spawn_worker(PUMP_THREAD_NAME, Arc::downgrade(self), receiver)
            .map_err(SdkError::EventPump)?;

        let provider_watch = vec![
            bus.subscribe(&endpoint, Notification::AddressProviderChanged, events.clone())?,
            bus.subscribe(&endpoint, Notification::PositionProviderChanged, events.clone())?,
        ];

        let address = Binding {
            endpoint: endpoint.clone(),
            provider: None,
            _subscription: bus.subscribe(&endpoint, Notification::AddressChanged, events.clone())?,
        };
        bus.address_start(&endpoint)?;

        let position = Binding {
            endpoint: endpoint.clone(),
            provider: None,
            _subscription: bus.subscribe(&endpoint, Notification::PositionChanged, events.clone())?,
        };
        bus.position_start(&endpoint)?;

        bus.set_requirements(&endpoint, requirements)?;

        let readings = [
            Reading::Address(bus.get_address(&endpoint)?),
            Reading::Position(bus.get_position(&endpoint)?),
        ];

        let session = Session {
            endpoint,
            address,
            position,
            _provider_watch: provider_watch,
            events,
            published,
            workers: vec![pump, notifier],
        };
        Ok((session, readings))
    }

    /// Rebind `role` to `descriptor`'s object and refresh from it
    ///
    /// `prepare` runs against the new endpoint before anything is rebound.
    fn switch<P>(&self, role: Role, descriptor: &ProviderDescriptor, prepare: P) -> Result<()>
    where
        P: FnOnce(&dyn GeoclueBus, &Endpoint) -> geoclue_api::Result<()>,
    {
        let endpoint = Endpoint::from(descriptor);
        let bus = self.bus.as_ref();

        let mut state = self.lock_state();
        let session = state.active_mut()?;

        prepare(bus, &endpoint)?;

        let subscription = bus.subscribe(&endpoint, role.notification(), session.events.clone())?;
        let binding = Binding {
            endpoint: endpoint.clone(),
            provider: Some(descriptor.name.clone()),
            _subscription: subscription,
        };
        let previous = std::mem::replace(role.binding_mut(session), binding);

        match role.refresh(bus, &endpoint) {
            Ok(reading) => {
                tracing::info!(
                    "{:?} provider switched from '{}' to '{}'",
                    role,
                    previous.label(),
                    descriptor.name
                );
                drop(previous);
                session.publish(self.snapshot.update(|s| reading.apply(s)));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Refresh from '{}' failed, keeping '{}': {}",
                    descriptor.name,
                    previous.label(),
                    e
                );
                *role.binding_mut(session) = previous;
                Err(e.into())
            }
        }
    }

    fn close(&self) {
        let previous = std::mem::replace(&mut *self.lock_state(), SessionState::Closed);

        if let SessionState::Active(mut session) = previous {
            tracing::info!("Closing location session {}", session.endpoint);
            let workers = std::mem::take(&mut session.workers);
            // Dropping the session cancels its subscriptions and the last
            // senders, which ends both workers
            drop(session);

            for worker in workers {
                if worker.thread().id() != thread::current().id() && worker.join().is_err() {
                    tracing::error!("Worker thread panicked");
                }
            }
        }
    }
}

impl EventSink<BusEvent> for Inner {
    fn handle_event(&self, event: BusEvent) {
        let state = self.lock_state();
        let SessionState::Active(session) = &*state else {
            tracing::debug!("Dropping event from {}: session not active", event.source);
            return;
        };

        let (binding, reading) = match event.payload {
            EventPayload::Address(update) => (&session.address, Reading::Address(update)),
            EventPayload::Position(update) => (&session.position, Reading::Position(update)),
            EventPayload::AddressProvider(change) => {
                tracing::info!("Master switched address provider to '{}'", change.name);
                return;
            }
            EventPayload::PositionProvider(change) => {
                tracing::info!("Master switched position provider to '{}'", change.name);
                return;
            }
        };

        if binding.endpoint != event.source {
            tracing::debug!(
                "Ignoring update from {}, bound to {}",
                event.source,
                binding.endpoint
            );
            return;
        }

        session.publish(self.snapshot.update(|s| reading.apply(s)));
    }
}

impl EventSink<Arc<LocationSnapshot>> for Inner {
    fn handle_event(&self, snapshot: Arc<LocationSnapshot>) {
        self.signal.emit(&snapshot);
    }
}
