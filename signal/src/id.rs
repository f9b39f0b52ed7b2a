//! Subscription handles

use std::fmt;

/// Lowest identifier ever handed out
pub(crate) const MIN_ID: u32 = 1;

/// Highest identifier ever handed out
pub(crate) const MAX_ID: u32 = 100_000_000;

/// Opaque handle identifying one `connect` registration
///
/// Handles are unique among the live subscriptions of a signal. Once a
/// subscription is disconnected its value may be handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    pub(crate) fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw numeric value of the handle
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}
