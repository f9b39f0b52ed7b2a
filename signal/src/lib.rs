//! Generic Signal/Slot Dispatcher
//!
//! A small, thread-safe notification primitive: register any number of
//! callbacks, fire an event, and every callback is invoked synchronously in
//! registration order.
//!
//! # Features
//!
//! - **Unique Handles**: Every `connect` returns a fresh `SubscriptionId`
//! - **Ordered Delivery**: Callbacks run in the order they were connected
//! - **Accumulators**: Aggregate callback return values or stop early
//! - **Panic Isolation**: A panicking callback is logged and skipped
//!
//! # Quick Start
//!
//! ```rust
//! use signal::Signal;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let signal = Signal::<String>::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&hits);
//! let id = signal.connect(move |msg: &String| {
//!     assert_eq!(msg, "changed");
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! signal.emit(&"changed".to_string());
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! signal.disconnect(id);
//! assert!(signal.is_empty());
//! ```
//!
//! # Accumulators
//!
//! ```rust
//! use signal::{Signal, UntilTrue};
//!
//! let signal = Signal::<u32, bool>::new();
//! signal.connect(|v: &u32| *v > 10);
//! signal.connect(|v: &u32| *v > 5);
//!
//! // Stops at the first callback returning true
//! assert!(signal.emit_with(&7, UntilTrue::default()));
//! ```

pub mod accumulator;
pub mod id;
pub mod signal;

pub use accumulator::{Accumulator, Collect, Discard, UntilTrue};
pub use id::SubscriptionId;
pub use signal::Signal;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::accumulator::{Accumulator, Collect, Discard, UntilTrue};
    pub use crate::id::SubscriptionId;
    pub use crate::signal::Signal;
}
