use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::Accuracy;

bitflags! {
    /// Which coordinates of a position reading are valid
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PositionFields: u32 {
        const LATITUDE = 1;
        const LONGITUDE = 2;
        const ALTITUDE = 4;
    }
}

/// One `GetPosition` reply or `PositionChanged` notification
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub fields: PositionFields,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy: Accuracy,
}

/// Raw `(i i d d d (idd))` tuple carried by the position interface
pub type PositionWire = (i32, i32, f64, f64, f64, (i32, f64, f64));

impl PositionUpdate {
    pub fn from_wire(
        (fields, timestamp, latitude, longitude, altitude, accuracy): PositionWire,
    ) -> Self {
        Self {
            fields: PositionFields::from_bits_truncate(fields as u32),
            timestamp: i64::from(timestamp),
            latitude,
            longitude,
            altitude,
            accuracy: Accuracy::from_wire(accuracy),
        }
    }

    /// Whether both latitude and longitude are valid
    pub fn has_coordinates(&self) -> bool {
        self.fields
            .contains(PositionFields::LATITUDE | PositionFields::LONGITUDE)
    }
}
