use geoclue_providers::{
    ADDRESS_INTERFACE, GEOCODE_INTERFACE, POSITION_INTERFACE, REVERSE_GEOCODE_INTERFACE,
};

/// Well-known name of the master service
pub const MASTER_SERVICE: &str = "org.freedesktop.Geoclue.Master";

/// Object path of the master object
pub const MASTER_PATH: &str = "/org/freedesktop/Geoclue/Master";

/// The bus interfaces the location service exposes
///
/// Providers implement a subset of these; the master client session
/// implements `MasterClient`, `Address` and `Position` on one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    /// Session factory on the master object
    Master,
    /// Per-session requirements and provider selection
    MasterClient,
    /// Status and identity, implemented by every provider
    Geoclue,
    /// Current postal address
    Address,
    /// Current coordinates
    Position,
    /// Address to coordinates
    Geocode,
    /// Coordinates to address
    ReverseGeocode,
    /// User-supplied address with an expiry
    Manual,
    /// Address keyed to the local network gateway
    Localnet,
}

impl Interface {
    /// Get the fully qualified interface name
    pub fn name(&self) -> &'static str {
        match self {
            Interface::Master => "org.freedesktop.Geoclue.Master",
            Interface::MasterClient => "org.freedesktop.Geoclue.MasterClient",
            Interface::Geoclue => "org.freedesktop.Geoclue",
            Interface::Address => ADDRESS_INTERFACE,
            Interface::Position => POSITION_INTERFACE,
            Interface::Geocode => GEOCODE_INTERFACE,
            Interface::ReverseGeocode => REVERSE_GEOCODE_INTERFACE,
            Interface::Manual => "org.freedesktop.Geoclue.Manual",
            Interface::Localnet => "org.freedesktop.Geoclue.Localnet",
        }
    }
}

impl std::fmt::Display for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
