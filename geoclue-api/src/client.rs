use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::mpsc;
use std::time::Duration;

use futures::StreamExt;
use zbus::{CacheProperties, Connection, ProxyBuilder, SignalStream};

use crate::bus::{BusEvent, EventPayload, GeoclueBus, Notification, Subscription};
use crate::error::{ApiError, Result};
use crate::interface::{Interface, MASTER_PATH, MASTER_SERVICE};
use crate::model::{
    Accuracy, Address, AddressUpdate, CanonicalAddress, Endpoint, ManualProvider, PositionUpdate,
    PositionWire, ProviderChange, ProviderInfo, ProviderStatus, Requirements,
};
use crate::proxies::{
    AddressProxy, LocalnetProxy, ManualProxy, MasterClientProxy, MasterProxy, PositionProxy,
    ProviderProxy, ReverseGeocodeProxy,
};

/// Which message bus to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusKind {
    /// The per-login session bus (where the service normally lives)
    #[default]
    Session,
    /// The system-wide bus
    System,
}

impl FromStr for BusKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(BusKind::Session),
            "system" => Ok(BusKind::System),
            other => Err(ApiError::InvalidName(format!("unknown bus '{}'", other))),
        }
    }
}

/// Connection settings for [`DbusClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub bus: BusKind,
    /// Upper bound on every remote call
    pub call_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::Session,
            call_timeout: Duration::from_secs(10),
        }
    }
}

/// Blocking [`GeoclueBus`] over a real bus connection
///
/// The client owns a small tokio runtime. Remote calls block the calling
/// thread on that runtime and are cut off after `call_timeout`; notification
/// streams run as tasks on it and forward into the caller's channel.
///
/// Calls must not be made from inside another async runtime.
pub struct DbusClient {
    runtime: tokio::runtime::Runtime,
    connection: Connection,
    config: ClientConfig,
}

impl DbusClient {
    /// Connect to the session bus with default settings
    pub fn session() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("geoclue-bus")
            .enable_all()
            .build()
            .map_err(|e| ApiError::Connection(format!("failed to start bus runtime: {}", e)))?;

        let bus = config.bus;
        let connection = runtime
            .block_on(async move {
                match bus {
                    BusKind::Session => Connection::session().await,
                    BusKind::System => Connection::system().await,
                }
            })
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        tracing::debug!("Connected to {:?} bus", config.bus);

        Ok(Self {
            runtime,
            connection,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run one remote call to completion, bounded by the call timeout
    fn call<T, F>(&self, method: &'static str, future: F) -> Result<T>
    where
        F: Future<Output = zbus::Result<T>>,
    {
        let after = self.config.call_timeout;
        tracing::trace!("Calling {}", method);

        self.runtime.block_on(async move {
            match tokio::time::timeout(after, future).await {
                Ok(result) => result.map_err(|e| ApiError::call(method, e)),
                Err(_) => Err(ApiError::Timeout { method, after }),
            }
        })
    }
}

impl std::fmt::Debug for DbusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbusClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Build a proxy of type `P` for `interface` on the object at `endpoint`
async fn bind<P>(connection: &Connection, endpoint: &Endpoint, interface: Interface) -> zbus::Result<P>
where
    P: From<zbus::Proxy<'static>>,
{
    ProxyBuilder::<P>::new_bare(connection)
        .destination(endpoint.service.clone())?
        .path(endpoint.path.clone())?
        .interface(interface.name())?
        .cache_properties(CacheProperties::No)
        .build()
        .await
}

fn wire_map(address: &CanonicalAddress) -> HashMap<&'static str, String> {
    address.to_map().into_iter().collect()
}

impl GeoclueBus for DbusClient {
    fn create_session(&self) -> Result<Endpoint> {
        let connection = self.connection.clone();
        let master = Endpoint::new(MASTER_SERVICE, MASTER_PATH);
        let path = self.call("Create", async move {
            let proxy: MasterProxy<'static> = bind(&connection, &master, Interface::Master).await?;
            proxy.create().await
        })?;

        tracing::debug!("Created session {}", path.as_str());
        Ok(Endpoint::master_session(path.as_str()))
    }

    fn address_start(&self, session: &Endpoint) -> Result<()> {
        let connection = self.connection.clone();
        let session = session.clone();
        self.call("AddressStart", async move {
            let proxy: MasterClientProxy<'static> =
                bind(&connection, &session, Interface::MasterClient).await?;
            proxy.address_start().await
        })
    }

    fn position_start(&self, session: &Endpoint) -> Result<()> {
        let connection = self.connection.clone();
        let session = session.clone();
        self.call("PositionStart", async move {
            let proxy: MasterClientProxy<'static> =
                bind(&connection, &session, Interface::MasterClient).await?;
            proxy.position_start().await
        })
    }

    fn set_requirements(&self, session: &Endpoint, requirements: &Requirements) -> Result<()> {
        let connection = self.connection.clone();
        let session = session.clone();
        let req = *requirements;
        self.call("SetRequirements", async move {
            let proxy: MasterClientProxy<'static> =
                bind(&connection, &session, Interface::MasterClient).await?;
            proxy
                .set_requirements(
                    req.accuracy.as_raw(),
                    req.min_time,
                    req.require_updates,
                    req.resources.bits() as i32,
                )
                .await
        })
    }

    fn address_provider(&self, session: &Endpoint) -> Result<ProviderChange> {
        let connection = self.connection.clone();
        let session = session.clone();
        let raw = self.call("GetAddressProvider", async move {
            let proxy: MasterClientProxy<'static> =
                bind(&connection, &session, Interface::MasterClient).await?;
            proxy.get_address_provider().await
        })?;
        Ok(ProviderChange::from_wire(raw))
    }

    fn position_provider(&self, session: &Endpoint) -> Result<ProviderChange> {
        let connection = self.connection.clone();
        let session = session.clone();
        let raw = self.call("GetPositionProvider", async move {
            let proxy: MasterClientProxy<'static> =
                bind(&connection, &session, Interface::MasterClient).await?;
            proxy.get_position_provider().await
        })?;
        Ok(ProviderChange::from_wire(raw))
    }

    fn get_address(&self, endpoint: &Endpoint) -> Result<AddressUpdate> {
        let connection = self.connection.clone();
        let endpoint = endpoint.clone();
        let (timestamp, fields, accuracy) = self.call("GetAddress", async move {
            let proxy: AddressProxy<'static> = bind(&connection, &endpoint, Interface::Address).await?;
            proxy.get_address().await
        })?;
        Ok(AddressUpdate::from_wire(timestamp, fields, accuracy))
    }

    fn get_position(&self, endpoint: &Endpoint) -> Result<PositionUpdate> {
        let connection = self.connection.clone();
        let endpoint = endpoint.clone();
        let raw = self.call("GetPosition", async move {
            let proxy: PositionProxy<'static> =
                bind(&connection, &endpoint, Interface::Position).await?;
            proxy.get_position().await
        })?;
        Ok(PositionUpdate::from_wire(raw))
    }

    fn set_address(
        &self,
        endpoint: &Endpoint,
        provider: ManualProvider,
        address: &CanonicalAddress,
    ) -> Result<()> {
        let connection = self.connection.clone();
        let endpoint = endpoint.clone();
        let fields = wire_map(address);

        self.call("SetAddress", async move {
            let borrowed: HashMap<&str, &str> =
                fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
            match provider {
                ManualProvider::Manual => {
                    let proxy: ManualProxy<'static> =
                        bind(&connection, &endpoint, Interface::Manual).await?;
                    // Zero means the address never expires
                    proxy.set_address(0, &borrowed).await
                }
                ManualProvider::Localnet => {
                    let proxy: LocalnetProxy<'static> =
                        bind(&connection, &endpoint, Interface::Localnet).await?;
                    proxy.set_address(&borrowed).await
                }
            }
        })
    }

    fn status(&self, endpoint: &Endpoint) -> Result<ProviderStatus> {
        let connection = self.connection.clone();
        let endpoint = endpoint.clone();
        let raw = self.call("GetStatus", async move {
            let proxy: ProviderProxy<'static> =
                bind(&connection, &endpoint, Interface::Geoclue).await?;
            proxy.get_status().await
        })?;
        Ok(ProviderStatus::from_raw(raw))
    }

    fn provider_info(&self, endpoint: &Endpoint) -> Result<ProviderInfo> {
        let connection = self.connection.clone();
        let endpoint = endpoint.clone();
        let (name, description) = self.call("GetProviderInfo", async move {
            let proxy: ProviderProxy<'static> =
                bind(&connection, &endpoint, Interface::Geoclue).await?;
            proxy.get_provider_info().await
        })?;
        Ok(ProviderInfo { name, description })
    }

    fn position_to_address(
        &self,
        endpoint: &Endpoint,
        latitude: f64,
        longitude: f64,
        accuracy: &Accuracy,
    ) -> Result<Vec<Address>> {
        let connection = self.connection.clone();
        let endpoint = endpoint.clone();
        let accuracy = accuracy.to_wire();
        let (fields, _address_accuracy) = self.call("PositionToAddress", async move {
            let proxy: ReverseGeocodeProxy<'static> =
                bind(&connection, &endpoint, Interface::ReverseGeocode).await?;
            proxy.position_to_address(latitude, longitude, &accuracy).await
        })?;
        Ok(vec![Address::from_map(fields)])
    }

    fn subscribe(
        &self,
        endpoint: &Endpoint,
        notification: Notification,
        sink: mpsc::Sender<BusEvent>,
    ) -> Result<Subscription> {
        let interface = match notification {
            Notification::AddressChanged => Interface::Address,
            Notification::PositionChanged => Interface::Position,
            Notification::AddressProviderChanged | Notification::PositionProviderChanged => {
                Interface::MasterClient
            }
        };
        let member = notification.member();

        let connection = self.connection.clone();
        let target = endpoint.clone();
        let stream = self.call("AddMatch", async move {
            let proxy: zbus::Proxy<'static> = bind(&connection, &target, interface).await?;
            proxy.receive_signal(member).await
        })?;

        let description = format!("{} {}", endpoint, member);
        tracing::debug!("Subscribed to {}", description);

        let task = self
            .runtime
            .spawn(forward(stream, endpoint.clone(), notification, sink));
        Ok(Subscription::new(description, move || task.abort()))
    }
}

/// Decode signals from `stream` and push them into `sink` until either side closes
async fn forward(
    mut stream: SignalStream<'static>,
    source: Endpoint,
    notification: Notification,
    sink: mpsc::Sender<BusEvent>,
) {
    while let Some(message) = stream.next().await {
        let payload = match decode(notification, &message) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    "Dropping malformed {} from {}: {}",
                    notification.member(),
                    source,
                    e
                );
                continue;
            }
        };

        if sink.send(BusEvent::new(source.clone(), payload)).is_err() {
            tracing::debug!("Event receiver dropped, stopping {} forwarder", notification.member());
            break;
        }
    }
}

fn decode(notification: Notification, message: &zbus::Message) -> zbus::Result<EventPayload> {
    let payload = match notification {
        Notification::AddressChanged => {
            let (timestamp, fields, accuracy) =
                message.body::<(i32, HashMap<String, String>, (i32, f64, f64))>()?;
            EventPayload::Address(AddressUpdate::from_wire(timestamp, fields, accuracy))
        }
        Notification::PositionChanged => {
            EventPayload::Position(PositionUpdate::from_wire(message.body::<PositionWire>()?))
        }
        Notification::AddressProviderChanged => {
            EventPayload::AddressProvider(ProviderChange::from_wire(message.body()?))
        }
        Notification::PositionProviderChanged => {
            EventPayload::PositionProvider(ProviderChange::from_wire(message.body()?))
        }
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_kind_parse() {
        assert_eq!("session".parse::<BusKind>().unwrap(), BusKind::Session);
        assert_eq!(" System ".parse::<BusKind>().unwrap(), BusKind::System);
        assert!(matches!(
            "starship".parse::<BusKind>(),
            Err(ApiError::InvalidName(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.bus, BusKind::Session);
        assert_eq!(config.call_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_wire_map_sends_all_keys() {
        let address = CanonicalAddress {
            street: "Mannerheimintie 1".into(),
            ..Default::default()
        };
        let map = wire_map(&address);
        assert_eq!(map.len(), 6);
        assert_eq!(map["street"], "Mannerheimintie 1");
        assert_eq!(map["countrycode"], "");
    }
}
