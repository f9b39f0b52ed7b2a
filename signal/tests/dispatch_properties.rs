//! Property-based tests for signal delivery
//!
//! Validates ordering, early termination and subscription bookkeeping for
//! arbitrary subscriber populations.

use proptest::prelude::*;
use signal::{Accumulator, Signal};
use std::sync::{Arc, Mutex};

/// Stops as soon as a callback returns `true`, recording what it saw
struct StopOnFlag {
    seen: Vec<bool>,
}

impl Accumulator<bool> for StopOnFlag {
    type Output = Vec<bool>;

    fn accumulate(&mut self, value: bool) -> bool {
        self.seen.push(value);
        !value
    }

    fn finalize(self) -> Self::Output {
        self.seen
    }
}

proptest! {
    #[test]
    fn prop_delivery_follows_registration_order(count in 1usize..40) {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for index in 0..count {
            let order = Arc::clone(&order);
            signal.connect(move |_: &()| order.lock().unwrap().push(index));
        }

        signal.emit(&());

        let expected: Vec<usize> = (0..count).collect();
        prop_assert_eq!(order.lock().unwrap().clone(), expected);
    }

    #[test]
    fn prop_delivery_halts_at_first_stop(flags in prop::collection::vec(any::<bool>(), 0..30)) {
        let signal = Signal::<(), bool>::new();
        let invoked = Arc::new(Mutex::new(0usize));

        for flag in flags.clone() {
            let invoked = Arc::clone(&invoked);
            signal.connect(move |_: &()| {
                *invoked.lock().unwrap() += 1;
                flag
            });
        }

        let seen = signal.emit_with(&(), StopOnFlag { seen: Vec::new() });

        let expected_len = flags
            .iter()
            .position(|flag| *flag)
            .map(|stop| stop + 1)
            .unwrap_or(flags.len());
        prop_assert_eq!(seen.len(), expected_len);
        prop_assert_eq!(*invoked.lock().unwrap(), expected_len);
        prop_assert_eq!(&seen[..], &flags[..expected_len]);
    }

    #[test]
    fn prop_disconnecting_every_handle_empties_signal(count in 0usize..40) {
        let signal = Signal::<()>::new();
        let ids: Vec<_> = (0..count).map(|_| signal.connect(|_: &()| {})).collect();

        prop_assert_eq!(signal.len(), count);
        for id in ids {
            prop_assert!(signal.disconnect(id));
        }
        prop_assert!(signal.is_empty());
    }
}

#[test]
fn test_disconnect_all_after_many_connects() {
    let signal = Signal::<u8>::new();
    let hits = Arc::new(Mutex::new(0u32));
    for _ in 0..10 {
        let hits = Arc::clone(&hits);
        signal.connect(move |_: &u8| *hits.lock().unwrap() += 1);
    }

    signal.disconnect_all();
    signal.emit(&0);

    assert_eq!(*hits.lock().unwrap(), 0);
}

#[test]
fn test_emit_from_several_threads() {
    let signal = Signal::<u32>::new();
    let total = Arc::new(Mutex::new(0u32));
    {
        let total = Arc::clone(&total);
        signal.connect(move |v: &u32| *total.lock().unwrap() += *v);
    }

    let handles: Vec<_> = (1..=4u32)
        .map(|n| {
            let signal = signal.clone();
            std::thread::spawn(move || signal.emit(&n))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*total.lock().unwrap(), 10);
}
