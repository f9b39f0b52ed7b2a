//! Shared fixtures for facade tests
//!
//! [`FakeBus`] stands in for the location service: it serves canned
//! readings per object, records every call, can be told to fail a given
//! method, and delivers notifications to live subscriptions on demand.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use geoclue_api::{
    Accuracy, AccuracyLevel, Address, AddressUpdate, ApiError, BusEvent, CanonicalAddress,
    Endpoint, EventPayload, GeoclueBus, ManualProvider, Notification, PositionFields,
    PositionUpdate, ProviderChange, ProviderInfo, ProviderStatus, Requirements, Subscription,
};
use geoclue_sdk::{Capabilities, GeoclueSystem, LocationSnapshot, ProviderDescriptor};

pub const SESSION_PATH: &str = "/org/freedesktop/Geoclue/Master/client0";

/// How long to wait for a notification to reach a subscriber
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to wait before concluding nothing was delivered
pub const SILENCE: Duration = Duration::from_millis(150);

pub fn session_endpoint() -> Endpoint {
    Endpoint::master_session(SESSION_PATH)
}

pub fn descriptor(name: &str, short: &str, caps: Capabilities) -> ProviderDescriptor {
    ProviderDescriptor {
        name: name.to_string(),
        service: format!("org.freedesktop.Geoclue.Providers.{}", short),
        path: format!("/org/freedesktop/Geoclue/Providers/{}", short),
        capabilities: caps,
        file: None,
    }
}

/// A typical installation
pub fn standard_descriptors() -> Vec<ProviderDescriptor> {
    vec![
        descriptor("Gpsd", "Gpsd", Capabilities::POSITION),
        descriptor(
            "Hostip",
            "Hostip",
            Capabilities::ADDRESS | Capabilities::POSITION,
        ),
        descriptor("Manual", "Manual", Capabilities::ADDRESS),
        descriptor("Localnet", "Localnet", Capabilities::ADDRESS),
        descriptor(
            "Geonames Provider",
            "Geonames",
            Capabilities::GEOCODE | Capabilities::REVERSE_GEOCODE,
        ),
    ]
}

pub fn endpoint_of(short: &str) -> Endpoint {
    Endpoint::new(
        format!("org.freedesktop.Geoclue.Providers.{}", short),
        format!("/org/freedesktop/Geoclue/Providers/{}", short),
    )
}

pub fn position(latitude: f64, longitude: f64, timestamp: i64) -> PositionUpdate {
    PositionUpdate {
        fields: PositionFields::LATITUDE | PositionFields::LONGITUDE,
        timestamp,
        latitude,
        longitude,
        altitude: 0.0,
        accuracy: Accuracy::new(AccuracyLevel::Detailed, 10.0, 0.0),
    }
}

pub fn address(pairs: &[(&str, &str)], timestamp: i64) -> AddressUpdate {
    AddressUpdate {
        timestamp,
        address: Address::from_map(pairs.iter().copied()),
        accuracy: Accuracy::new(AccuracyLevel::Locality, 0.0, 0.0),
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    failing: HashSet<String>,
    addresses: HashMap<Endpoint, AddressUpdate>,
    positions: HashMap<Endpoint, PositionUpdate>,
    statuses: HashMap<Endpoint, ProviderStatus>,
    infos: HashMap<Endpoint, ProviderInfo>,
    reverse: Vec<Address>,
    address_provider: ProviderChange,
    position_provider: ProviderChange,
    requirements: Vec<Requirements>,
    pushed: Vec<(Endpoint, ManualProvider, CanonicalAddress)>,
    subscribers: Vec<(u64, Endpoint, Notification, Sender<BusEvent>)>,
    next_subscription: u64,
}

/// In-memory location service
#[derive(Clone, Default)]
pub struct FakeBus {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBus {
    /// A service whose session reports an address in Evora and a position nearby
    pub fn new() -> Self {
        let bus = FakeBus::default();
        bus.put_address(
            &session_endpoint(),
            address(
                &[("locality", "Evora"), ("country", "Portugal"), ("countrycode", "PT")],
                100,
            ),
        );
        bus.put_position(&session_endpoint(), position(38.5714, -7.9135, 100));
        bus.put_position(&endpoint_of("Gpsd"), position(38.5667, -7.9000, 200));
        bus.put_position(&endpoint_of("Hostip"), position(38.7223, -9.1393, 150));
        bus.put_address(
            &endpoint_of("Hostip"),
            address(&[("locality", "Lisbon"), ("region", "Lisboa")], 150),
        );
        bus.put_address(&endpoint_of("Manual"), address(&[("street", "Rua Nova")], 300));
        bus.put_address(&endpoint_of("Localnet"), address(&[("area", "Centro")], 310));
        {
            let mut state = bus.lock();
            state.address_provider = ProviderChange {
                name: "Hostip".into(),
                description: "Hostip provides geolocation from IP".into(),
                service: endpoint_of("Hostip").service,
                path: endpoint_of("Hostip").path,
            };
            state.position_provider = ProviderChange {
                name: "Gpsd".into(),
                description: "Gpsd provider".into(),
                service: endpoint_of("Gpsd").service,
                path: endpoint_of("Gpsd").path,
            };
        }
        bus
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Make `method` fail until [`FakeBus::recover`] is called
    pub fn fail(&self, method: &str) {
        self.lock().failing.insert(method.to_string());
    }

    pub fn recover(&self, method: &str) {
        self.lock().failing.remove(method);
    }

    pub fn put_address(&self, endpoint: &Endpoint, update: AddressUpdate) {
        self.lock().addresses.insert(endpoint.clone(), update);
    }

    pub fn put_position(&self, endpoint: &Endpoint, update: PositionUpdate) {
        self.lock().positions.insert(endpoint.clone(), update);
    }

    pub fn put_status(&self, endpoint: &Endpoint, status: ProviderStatus) {
        self.lock().statuses.insert(endpoint.clone(), status);
    }

    pub fn put_info(&self, endpoint: &Endpoint, info: ProviderInfo) {
        self.lock().infos.insert(endpoint.clone(), info);
    }

    pub fn put_reverse(&self, addresses: Vec<Address>) {
        self.lock().reverse = addresses;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.as_str() == method).count()
    }

    pub fn requirements(&self) -> Vec<Requirements> {
        self.lock().requirements.clone()
    }

    pub fn pushed_addresses(&self) -> Vec<(Endpoint, ManualProvider, CanonicalAddress)> {
        self.lock().pushed.clone()
    }

    /// Live subscriptions for `notification` on `endpoint`
    pub fn subscriptions(&self, endpoint: &Endpoint, notification: Notification) -> usize {
        self.lock()
            .subscribers
            .iter()
            .filter(|(_, e, n, _)| e == endpoint && *n == notification)
            .count()
    }

    pub fn total_subscriptions(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Deliver a notification from `source` to every matching subscription
    ///
    /// Returns how many subscriptions it reached.
    pub fn emit(&self, source: &Endpoint, payload: EventPayload) -> usize {
        let notification = match &payload {
            EventPayload::Address(_) => Notification::AddressChanged,
            EventPayload::Position(_) => Notification::PositionChanged,
            EventPayload::AddressProvider(_) => Notification::AddressProviderChanged,
            EventPayload::PositionProvider(_) => Notification::PositionProviderChanged,
        };
        let sinks: Vec<Sender<BusEvent>> = self
            .lock()
            .subscribers
            .iter()
            .filter(|(_, e, n, _)| e == source && *n == notification)
            .map(|(_, _, _, sink)| sink.clone())
            .collect();

        sinks
            .iter()
            .filter(|sink| {
                sink.send(BusEvent::new(source.clone(), payload.clone()))
                    .is_ok()
            })
            .count()
    }

    fn enter(&self, method: &'static str) -> geoclue_api::Result<()> {
        let mut state = self.lock();
        state.calls.push(method.to_string());
        if state.failing.contains(method) {
            Err(ApiError::call(method, "org.freedesktop.DBus.Error.Failed"))
        } else {
            Ok(())
        }
    }

    fn missing(method: &'static str, endpoint: &Endpoint) -> ApiError {
        ApiError::call(
            method,
            format!("org.freedesktop.DBus.Error.ServiceUnknown: {}", endpoint),
        )
    }
}

impl GeoclueBus for FakeBus {
    fn create_session(&self) -> geoclue_api::Result<Endpoint> {
        self.enter("Create")?;
        Ok(session_endpoint())
    }

    fn address_start(&self, _session: &Endpoint) -> geoclue_api::Result<()> {
        self.enter("AddressStart")
    }

    fn position_start(&self, _session: &Endpoint) -> geoclue_api::Result<()> {
        self.enter("PositionStart")
    }

    fn set_requirements(
        &self,
        _session: &Endpoint,
        requirements: &Requirements,
    ) -> geoclue_api::Result<()> {
        self.enter("SetRequirements")?;
        self.lock().requirements.push(*requirements);
        Ok(())
    }

    fn address_provider(&self, _session: &Endpoint) -> geoclue_api::Result<ProviderChange> {
        self.enter("GetAddressProvider")?;
        Ok(self.lock().address_provider.clone())
    }

    fn position_provider(&self, _session: &Endpoint) -> geoclue_api::Result<ProviderChange> {
        self.enter("GetPositionProvider")?;
        Ok(self.lock().position_provider.clone())
    }

    fn get_address(&self, endpoint: &Endpoint) -> geoclue_api::Result<AddressUpdate> {
        self.enter("GetAddress")?;
        self.lock()
            .addresses
            .get(endpoint)
            .cloned()
            .ok_or_else(|| Self::missing("GetAddress", endpoint))
    }

    fn get_position(&self, endpoint: &Endpoint) -> geoclue_api::Result<PositionUpdate> {
        self.enter("GetPosition")?;
        self.lock()
            .positions
            .get(endpoint)
            .copied()
            .ok_or_else(|| Self::missing("GetPosition", endpoint))
    }

    fn set_address(
        &self,
        endpoint: &Endpoint,
        provider: ManualProvider,
        address: &CanonicalAddress,
    ) -> geoclue_api::Result<()> {
        self.enter("SetAddress")?;
        self.lock()
            .pushed
            .push((endpoint.clone(), provider, address.clone()));
        Ok(())
    }

    fn status(&self, endpoint: &Endpoint) -> geoclue_api::Result<ProviderStatus> {
        self.enter("GetStatus")?;
        self.lock()
            .statuses
            .get(endpoint)
            .copied()
            .ok_or_else(|| Self::missing("GetStatus", endpoint))
    }

    fn provider_info(&self, endpoint: &Endpoint) -> geoclue_api::Result<ProviderInfo> {
        self.enter("GetProviderInfo")?;
        self.lock()
            .infos
            .get(endpoint)
            .cloned()
            .ok_or_else(|| Self::missing("GetProviderInfo", endpoint))
    }

    fn position_to_address(
        &self,
        _endpoint: &Endpoint,
        _latitude: f64,
        _longitude: f64,
        _accuracy: &Accuracy,
    ) -> geoclue_api::Result<Vec<Address>> {
        self.enter("PositionToAddress")?;
        Ok(self.lock().reverse.clone())
    }

    fn subscribe(
        &self,
        endpoint: &Endpoint,
        notification: Notification,
        sink: Sender<BusEvent>,
    ) -> geoclue_api::Result<Subscription> {
        self.enter("Subscribe")?;
        let id = {
            let mut state = self.lock();
            state.next_subscription += 1;
            let id = state.next_subscription;
            state
                .subscribers
                .push((id, endpoint.clone(), notification, sink));
            id
        };

        let state = Arc::downgrade(&self.state);
        Ok(Subscription::new(
            format!("{} {}", endpoint, notification.member()),
            move || {
                if let Some(state) = state.upgrade() {
                    state.lock().unwrap().subscribers.retain(|(sub, ..)| *sub != id);
                }
            },
        ))
    }
}

/// Facade over a [`FakeBus`] with the standard descriptor set
pub fn fake_system() -> (GeoclueSystem, FakeBus) {
    let bus = FakeBus::new();
    let system = GeoclueSystem::from_descriptors(standard_descriptors(), Arc::new(bus.clone()));
    (system, bus)
}

/// Subscribe a channel to the facade's snapshots
pub fn snapshot_channel(system: &GeoclueSystem) -> Receiver<LocationSnapshot> {
    let (tx, rx) = mpsc::channel();
    system.connect(move |snapshot| {
        let _ = tx.send(snapshot.clone());
    });
    rx
}

/// Write a descriptor file into `dir`
pub fn write_provider(dir: &Path, file: &str, name: &str, short: &str, interfaces: &str) {
    let content = format!(
        "[Geoclue Provider]\nName={}\nService=org.freedesktop.Geoclue.Providers.{}\nPath=/org/freedesktop/Geoclue/Providers/{}\nInterfaces={}\n",
        name, short, short, interfaces
    );
    std::fs::write(dir.join(file), content).unwrap();
}
