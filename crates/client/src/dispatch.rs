//! Event dispatch
//!
//! Subscribers are keyed by kind byte and run synchronously on the session
//! task, in registration order, after the session itself has handled the
//! record. A subscriber that returns an error or panics is logged and
//! skipped; the remaining subscribers still run.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use realmlink_protocol::{IncomingRecord, ServerPacket};

/// Error returned by a subscriber
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type SubscriberResult = Result<(), SubscriberError>;

pub type Subscriber = Box<dyn FnMut(&ServerPacket) -> SubscriberResult + Send>;

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct Dispatcher {
    subscribers: HashMap<u8, Vec<Subscriber>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for every record of `kind`
    pub fn subscribe<F>(&mut self, kind: u8, callback: F)
    where
        F: FnMut(&ServerPacket) -> SubscriberResult + Send + 'static,
    {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    /// Registers a callback receiving the typed record `R`
    pub fn on<R, F>(&mut self, mut callback: F)
    where
        R: IncomingRecord,
        F: FnMut(&R) -> SubscriberResult + Send + 'static,
    {
        self.subscribe(R::KIND, move |packet| match R::from_packet(packet) {
            Some(record) => callback(record),
            None => Ok(()),
        });
    }

    /// Total number of subscribers
    pub fn len(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_subscribers(&self, kind: u8) -> bool {
        self.subscribers.get(&kind).is_some_and(|list| !list.is_empty())
    }

    /// Hands `packet` to every subscriber of its kind
    pub fn dispatch(&mut self, packet: &ServerPacket) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(subscribers) = self.subscribers.get_mut(&packet.kind()) else {
            return report;
        };

        for (index, subscriber) in subscribers.iter_mut().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| subscriber(packet))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!(
                        kind = packet.kind(),
                        name = packet.name(),
                        subscriber = index,
                        error = %e,
                        "Subscriber failed"
                    );
                }
                Err(panic) => {
                    report.failed += 1;
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::warn!(
                        kind = packet.kind(),
                        name = packet.name(),
                        subscriber = index,
                        panic = %message,
                        "Subscriber panicked"
                    );
                }
            }
        }
        report
    }
}
