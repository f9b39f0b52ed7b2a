//! The `Signal` dispatcher
//!
//! Holds an ordered list of slots (callback + handle). Emission walks a copy
//! of that list, so callbacks are free to connect or disconnect while an
//! emission is in flight; such changes take effect on the next emission.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;

use crate::accumulator::{Accumulator, Discard};
use crate::id::{SubscriptionId, MAX_ID, MIN_ID};

type Callback<A, R> = Arc<dyn Fn(&A) -> R + Send + Sync>;

struct Slot<A, R> {
    id: SubscriptionId,
    callback: Callback<A, R>,
}

impl<A, R> Clone for Slot<A, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

/// Multi-subscriber notification primitive
///
/// `A` is the argument type passed by reference to every callback and `R`
/// the callback return type fed into the emission's accumulator.
///
/// Clones share the same subscriber list.
///
/// # Example
///
/// ```rust
/// use signal::{Collect, Signal};
///
/// let signal = Signal::<u32, u32>::new();
/// signal.connect(|v: &u32| v * 2);
/// signal.connect(|v: &u32| v + 1);
///
/// let results = signal.emit_with(&10, Collect::default());
/// assert_eq!(results, vec![20, 11]);
/// ```
pub struct Signal<A, R = ()> {
    slots: Arc<Mutex<Vec<Slot<A, R>>>>,
}

impl<A, R> Signal<A, R> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a callback, returning its unique handle
    ///
    /// Identical callbacks may be connected several times; every
    /// registration is independent and gets its own handle.
    pub fn connect<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        let mut slots = self.lock();
        let id = Self::unused_id(&slots);
        slots.push(Slot {
            id,
            callback: Arc::new(callback),
        });
        tracing::trace!("Connected {} ({} subscribers)", id, slots.len());
        id
    }

    /// Remove the subscription with the given handle
    ///
    /// Returns `false` when no such subscription exists; that is not an error
    /// and leaves other subscriptions untouched.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut slots = self.lock();
        match slots.iter().position(|slot| slot.id == id) {
            Some(index) => {
                slots.remove(index);
                tracing::trace!("Disconnected {} ({} subscribers)", id, slots.len());
                true
            }
            None => false,
        }
    }

    /// Remove every subscription
    pub fn disconnect_all(&self) {
        self.lock().clear();
    }

    /// Check whether a handle is currently connected
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.lock().iter().any(|slot| slot.id == id)
    }

    /// Handles of all live subscriptions, in delivery order
    pub fn ids(&self) -> Vec<SubscriptionId> {
        self.lock().iter().map(|slot| slot.id).collect()
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing is connected
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver `args` to every subscriber, ignoring return values
    pub fn emit(&self, args: &A) {
        self.emit_with(args, Discard)
    }

    /// Deliver `args` to every subscriber in registration order
    ///
    /// Each return value is fed to `accumulator`; delivery stops as soon as
    /// it returns `false`. A callback that panics is logged and skipped.
    pub fn emit_with<Acc>(&self, args: &A, mut accumulator: Acc) -> Acc::Output
    where
        Acc: Accumulator<R>,
    {
        let slots: Vec<Slot<A, R>> = self.lock().clone();

        for slot in &slots {
            match panic::catch_unwind(AssertUnwindSafe(|| (slot.callback)(args))) {
                Ok(value) => {
                    if !accumulator.accumulate(value) {
                        break;
                    }
                }
                Err(payload) => {
                    tracing::error!(
                        "Signal callback {} panicked: {}",
                        slot.id,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        accumulator.finalize()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Slot<A, R>>> {
        // Callbacks never run under this lock, so a poisoned list is still consistent
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unused_id(slots: &[Slot<A, R>]) -> SubscriptionId {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = rng.gen_range(MIN_ID..=MAX_ID);
            if !slots.iter().any(|slot| slot.id.value() == candidate) {
                return SubscriptionId::new(candidate);
            }
        }
    }
}

impl<A, R> Default for Signal<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Clone for Signal<A, R> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<A, R> std::fmt::Debug for Signal<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("subscriber_count", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{Collect, UntilTrue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_connect_returns_distinct_handles() {
        let signal = Signal::<()>::new();
        let ids: Vec<_> = (0..50).map(|_| signal.connect(|_: &()| {})).collect();

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| (MIN_ID..=MAX_ID).contains(&id.value())));
    }

    #[test]
    fn test_connect_then_disconnect_leaves_no_subscribers() {
        let signal = Signal::<()>::new();
        let id = signal.connect(|_: &()| {});

        assert!(signal.contains(id));
        assert!(signal.disconnect(id));
        assert!(signal.is_empty());
    }

    #[test]
    fn test_disconnect_unknown_is_noop() {
        let signal = Signal::<()>::new();
        let kept = signal.connect(|_: &()| {});

        let stale = signal.connect(|_: &()| {});
        signal.disconnect(stale);

        assert!(!signal.disconnect(stale));
        assert_eq!(signal.ids(), vec![kept]);
    }

    #[test]
    fn test_disconnect_all_stops_delivery() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let hits = Arc::clone(&hits);
            signal.connect(move |_: &()| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        signal.disconnect_all();
        signal.emit(&());

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_same_callback_connected_twice_runs_twice() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let callback = {
            let hits = Arc::clone(&hits);
            move |_: &()| {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        };

        signal.connect(callback.clone());
        signal.connect(callback);
        signal.emit(&());

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_with_stops_early() {
        let signal = Signal::<(), bool>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for result in [false, true, false] {
            let calls = Arc::clone(&calls);
            signal.connect(move |_: &()| {
                calls.fetch_add(1, Ordering::SeqCst);
                result
            });
        }

        assert!(signal.emit_with(&(), UntilTrue::default()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_callback_is_skipped() {
        let signal = Signal::<(), u8>::new();
        signal.connect(|_: &()| 1);
        signal.connect(|_: &()| panic!("boom"));
        signal.connect(|_: &()| 3);

        assert_eq!(signal.emit_with(&(), Collect::default()), vec![1, 3]);
    }

    #[test]
    fn test_callback_may_disconnect_itself() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let id = {
            let inner = signal.clone();
            let slot = Arc::clone(&slot);
            let hits = Arc::clone(&hits);
            signal.connect(move |_: &()| {
                hits.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = *slot.lock().unwrap() {
                    inner.disconnect(id);
                }
            })
        };
        *slot.lock().unwrap() = Some(id);

        signal.emit(&());
        signal.emit(&());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(signal.is_empty());
    }

    #[test]
    fn test_empty_signal_finalizes() {
        let signal = Signal::<(), u8>::new();
        assert!(signal.emit_with(&(), Collect::default()).is_empty());
    }
}
