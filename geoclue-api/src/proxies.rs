//! Proxy definitions for the service's bus interfaces
//!
//! Destinations and paths vary per provider. Each proxy defaults to the
//! master object and [`crate::DbusClient`] rebinds it to an
//! [`crate::Endpoint`] when it builds one.

use std::collections::HashMap;

use zbus::dbus_proxy;
use zbus::zvariant::OwnedObjectPath;

type AccuracyWire = (i32, f64, f64);

#[dbus_proxy(
    interface = "org.freedesktop.Geoclue.Master",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait Master {
    /// Create a client session object
    fn create(&self) -> zbus::Result<OwnedObjectPath>;
}

#[dbus_proxy(
    interface = "org.freedesktop.Geoclue.MasterClient",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait MasterClient {
    fn set_requirements(
        &self,
        accuracy_level: i32,
        time: i32,
        require_updates: bool,
        allowed_resources: i32,
    ) -> zbus::Result<()>;

    fn address_start(&self) -> zbus::Result<()>;

    fn position_start(&self) -> zbus::Result<()>;

    fn get_address_provider(&self) -> zbus::Result<(String, String, String, String)>;

    fn get_position_provider(&self) -> zbus::Result<(String, String, String, String)>;
}

/// Common interface every provider implements
#[dbus_proxy(
    interface = "org.freedesktop.Geoclue",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait Provider {
    fn get_status(&self) -> zbus::Result<i32>;

    fn get_provider_info(&self) -> zbus::Result<(String, String)>;
}

#[dbus_proxy(
    interface = "org.freedesktop.Geoclue.Address",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait Address {
    fn get_address(&self) -> zbus::Result<(i32, HashMap<String, String>, AccuracyWire)>;
}

#[dbus_proxy(
    interface = "org.freedesktop.Geoclue.Position",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait Position {
    fn get_position(&self) -> zbus::Result<(i32, i32, f64, f64, f64, AccuracyWire)>;
}

#[dbus_proxy(
    interface = "org.freedesktop.Geoclue.ReverseGeocode",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait ReverseGeocode {
    fn position_to_address(
        &self,
        latitude: f64,
        longitude: f64,
        position_accuracy: &AccuracyWire,
    ) -> zbus::Result<(HashMap<String, String>, AccuracyWire)>;
}

#[dbus_proxy(
    interface = "org.freedesktop.Geoclue.Manual",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait Manual {
    fn set_address(&self, valid_until: i32, address: &HashMap<&str, &str>) -> zbus::Result<()>;
}

#[dbus_proxy(
    interface = "org.freedesktop.Geoclue.Localnet",
    default_service = "org.freedesktop.Geoclue.Master",
    default_path = "/org/freedesktop/Geoclue/Master"
)]
trait Localnet {
    fn set_address(&self, address: &HashMap<&str, &str>) -> zbus::Result<()>;
}
