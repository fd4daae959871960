//! Synchronous topic-keyed event bus
//!
//! Handlers run on the emitting thread, in subscription order. The handler
//! list is snapshotted before delivery, so a handler subscribed while an
//! emit is in progress only sees later emits, and a handler unsubscribed
//! mid-delivery is skipped for the rest of it.

use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;

/// An event that can travel over an [`EventBus`]
pub trait BusEvent: Send + Sync + 'static {
    /// Key handlers subscribe to
    type Topic: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn topic(&self) -> Self::Topic;
}

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E: BusEvent> {
    topic: E::Topic,
    active: Arc<AtomicBool>,
    handler: Handler<E>,
}

/// Handle returned by [`EventBus::on`]
///
/// Dropping it keeps the handler registered; call [`Subscription::unsubscribe`]
/// to remove it. Clones share the same registration.
#[derive(Debug, Clone)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Stop delivering to the handler. Safe to call from inside the handler
    /// itself and more than once.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Publish/subscribe bus shared by every component of a context
pub struct EventBus<E: BusEvent> {
    entries: Arc<Mutex<Vec<Entry<E>>>>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("EventBus")
            .field("handlers", &entries.len())
            .finish()
    }
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register `handler` for `topic`
    pub fn on<F>(&self, topic: E::Topic, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|entry| entry.active.load(Ordering::SeqCst));
        entries.push(Entry {
            topic,
            active: Arc::clone(&active),
            handler: Arc::new(handler),
        });

        Subscription { active }
    }

    /// Register `handler` for `topic` and return the bus for further
    /// registrations. The handler stays registered for the bus's lifetime.
    pub fn chain_on<F>(&self, topic: E::Topic, handler: F) -> &Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let _ = self.on(topic, handler);
        self
    }

    /// Deliver `event` to every handler currently registered for its topic
    pub fn emit(&self, event: E) {
        let topic = event.topic();

        let targets: Vec<(Arc<AtomicBool>, Handler<E>)> = {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries
                .iter()
                .filter(|entry| entry.topic == topic)
                .map(|entry| (Arc::clone(&entry.active), Arc::clone(&entry.handler)))
                .collect()
        };

        for (active, handler) in targets {
            if !active.load(Ordering::SeqCst) {
                continue;
            }

            if panic::catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                error!(topic = ?topic, "event handler panicked");
            }
        }
    }

    /// Number of live handlers for `topic`
    pub fn handler_count(&self, topic: E::Topic) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .filter(|entry| entry.topic == topic && entry.active.load(Ordering::SeqCst))
            .count()
    }
}
