//! The last-known location
//!
//! A [`LocationSnapshot`] is immutable once published. Every update builds a
//! new snapshot and swaps it in whole, so readers never see an address from
//! one notification next to coordinates from a half-applied other.

use std::sync::{Arc, PoisonError, RwLock};

use geoclue_api::{Accuracy, Address, AddressUpdate, PositionUpdate};
use serde::Serialize;

/// Point-in-time view of the best-known address and position
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationSnapshot {
    /// Incremented on every published change, starting from zero
    pub version: u64,
    pub address: Address,
    /// Seconds since the Unix epoch of the last address reading
    pub address_timestamp: Option<i64>,
    pub address_accuracy: Option<Accuracy>,
    pub position: Option<PositionUpdate>,
}

impl LocationSnapshot {
    /// Copy with `update` merged into the address. Fields the update does
    /// not carry keep their previous value.
    pub fn with_address(&self, update: &AddressUpdate) -> Self {
        let mut next = self.clone();
        next.address.merge(&update.address);
        next.address_timestamp = Some(update.timestamp);
        next.address_accuracy = Some(update.accuracy);
        next.version += 1;
        next
    }

    /// Copy with the position replaced by `update`
    pub fn with_position(&self, update: &PositionUpdate) -> Self {
        let mut next = self.clone();
        next.position = Some(*update);
        next.version += 1;
        next
    }

    pub fn latitude(&self) -> Option<f64> {
        self.position.map(|p| p.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.position.map(|p| p.longitude)
    }

    pub fn altitude(&self) -> Option<f64> {
        self.position.map(|p| p.altitude)
    }

    pub fn position_timestamp(&self) -> Option<i64> {
        self.position.map(|p| p.timestamp)
    }

    /// `(latitude, longitude)` if a position has been received
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.position.map(|p| (p.latitude, p.longitude))
    }
}

/// Holder for the current snapshot with whole-value swaps
#[derive(Debug, Default)]
pub(crate) struct SnapshotCell {
    current: RwLock<Arc<LocationSnapshot>>,
}

impl SnapshotCell {
    pub(crate) fn load(&self) -> Arc<LocationSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the snapshot with `f(current)` and return the new one
    pub(crate) fn update<F>(&self, f: F) -> Arc<LocationSnapshot>
    where
        F: FnOnce(&LocationSnapshot) -> LocationSnapshot,
    {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(f(&current));
        *current = Arc::clone(&next);
        next
    }
}
