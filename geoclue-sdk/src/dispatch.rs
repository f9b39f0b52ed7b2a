//! Event and notification workers
//!
//! Bus notifications arrive on the bus client's own threads and are queued
//! into a channel. The event pump drains that channel and applies each event
//! to the snapshot. Every published snapshot, whether from the pump or from a
//! caller switching providers, is queued to the notifier, which is the only
//! thread that runs subscriber callbacks. Subscribers therefore see snapshots
//! one at a time and in version order.

use std::sync::mpsc::Receiver;
use std::sync::Weak;
use std::thread::{self, JoinHandle};

pub(crate) const PUMP_THREAD_NAME: &str = "geoclue-events";
pub(crate) const NOTIFY_THREAD_NAME: &str = "geoclue-notify";

/// Receiver of messages drained by a worker
pub(crate) trait EventSink<E>: Send + Sync {
    fn handle_event(&self, event: E);
}

/// Spawn a named worker thread draining `events` into `sink`
///
/// The thread exits when every sender is dropped or when `sink` is gone.
pub(crate) fn spawn_worker<S, E>(
    name: &str,
    sink: Weak<S>,
    events: Receiver<E>,
) -> std::io::Result<JoinHandle<()>>
where
    S: EventSink<E> + 'static,
    E: Send + 'static,
{
    thread::Builder::new().name(name.to_string()).spawn(move || {
        tracing::debug!("Worker started");
        for event in events.iter() {
            let Some(sink) = sink.upgrade() else {
                tracing::debug!("Facade dropped, stopping worker");
                return;
            };
            sink.handle_event(event);
        }
        tracing::debug!("Channel closed, worker stopped");
    })
}
