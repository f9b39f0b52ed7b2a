//! Typed records for everything that crosses the bus

mod accuracy;
mod address;
mod position;
mod provider;

pub use accuracy::{Accuracy, AccuracyLevel};
pub use address::{
    Address, AddressUpdate, CanonicalAddress, ADDRESS_KEYS, AREA, COUNTRY, COUNTRY_CODE, LOCALITY,
    REGION, STREET,
};
pub use position::{PositionFields, PositionUpdate, PositionWire};
pub use provider::{
    Endpoint, ManualProvider, ProviderChange, ProviderInfo, ProviderStatus, Requirements,
    ResourceFlags,
};
