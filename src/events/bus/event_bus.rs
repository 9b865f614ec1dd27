// src/events/bus/event_bus.rs
//
// Core event bus implementation.
//
// DESIGN PRINCIPLES:
// 1. Synchronous - handlers execute immediately in subscription order
// 2. Non-buffering - only handlers subscribed at emit time see an event
// 3. Observable - every emission is logged
// 4. Type-safe - events are strongly typed
// 5. Scoped - a Subscription removes its handler when dropped

use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use log::{debug, error};

use crate::events::types::DomainEvent;

/// Oldest entries are dropped past this size
const EVENT_LOG_CAPACITY: usize = 256;

/// Type-erased event handler function
/// Takes a reference to Any (downcasted to concrete event type inside)
type EventHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct HandlerEntry {
    token: u64,
    handler: EventHandler,
}

struct BusInner {
    /// Map from event TypeId to list of handlers
    handlers: RwLock<HashMap<TypeId, Vec<HandlerEntry>>>,

    /// Event emission log (for debugging)
    event_log: RwLock<VecDeque<EventLogEntry>>,

    next_token: AtomicU64,
}

impl BusInner {
    fn remove(&self, type_id: TypeId, token: u64) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = handlers.get_mut(&type_id) {
            list.retain(|entry| entry.token != token);
            if list.is_empty() {
                handlers.remove(&type_id);
            }
        }
    }
}

/// The Event Bus
///
/// Services emit events and subscribe to events without direct
/// dependencies on each other. Cloning yields another handle to the
/// same bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

/// A logged event for debugging and tracing
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub event_type: String,
    pub id: String,
    pub occurred_at: String,
    pub handler_count: usize,
}

/// Handle to one subscribed handler.
///
/// `unsubscribe` is idempotent. Dropping the handle unsubscribes, so a
/// handler lives exactly as long as its owner keeps the handle. The
/// handle does not keep the bus alive.
pub struct Subscription {
    bus: Weak<BusInner>,
    type_id: TypeId,
    token: u64,
    active: AtomicBool,
}

impl Subscription {
    /// Remove the handler. Later calls have no effect.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.type_id, self.token);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && self.bus.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .field("active", &self.is_active())
            .finish()
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                handlers: RwLock::new(HashMap::new()),
                event_log: RwLock::new(VecDeque::new()),
                next_token: AtomicU64::new(1),
            }),
        }
    }

    /// Subscribe to a specific event type
    ///
    /// The handler receives a reference to the concrete event.
    /// Handlers are executed in the order they are subscribed.
    ///
    /// Example:
    /// ```ignore
    /// let subscription = bus.subscribe::<FavoriteChanged, _>(|event| {
    ///     println!("event {} is now {}", event.event_id, event.is_favorite);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);

        // Wrap the typed handler in a type-erased closure
        let wrapped: EventHandler = Arc::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                error!(
                    "Failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        {
            let mut handlers = self
                .inner
                .handlers
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            handlers.entry(type_id).or_default().push(HandlerEntry {
                token,
                handler: wrapped,
            });
        }

        debug!(
            "Subscribed handler {} to {}",
            token,
            std::any::type_name::<E>()
        );

        Subscription {
            bus: Arc::downgrade(&self.inner),
            type_id,
            token,
            active: AtomicBool::new(true),
        }
    }

    /// Emit an event
    ///
    /// Handlers registered at this moment run synchronously, in
    /// subscription order. The handler list is snapshotted first, so a
    /// handler may subscribe or unsubscribe without deadlocking; such
    /// changes take effect from the next emission.
    ///
    /// If a handler panics, the panic is caught and logged, but other
    /// handlers still execute.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let type_id = TypeId::of::<E>();

        let snapshot: Vec<EventHandler> = {
            let handlers = self
                .inner
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            handlers
                .get(&type_id)
                .map(|list| list.iter().map(|entry| Arc::clone(&entry.handler)).collect())
                .unwrap_or_default()
        };

        let log_entry = EventLogEntry {
            event_type: event.event_type().to_string(),
            id: event.id().to_string(),
            occurred_at: event.occurred_at().to_rfc3339(),
            handler_count: snapshot.len(),
        };

        debug!(
            "[EVENT] {} (id: {}) | {} handlers",
            log_entry.event_type, log_entry.id, log_entry.handler_count
        );

        {
            let mut log = self
                .inner
                .event_log
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if log.len() == EVENT_LOG_CAPACITY {
                log.pop_front();
            }
            log.push_back(log_entry);
        }

        for (idx, handler) in snapshot.iter().enumerate() {
            // Catch panics to prevent one handler from breaking others
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(&event as &dyn Any);
            }));

            if let Err(e) = result {
                error!(
                    "Handler {} for {} panicked: {:?}",
                    idx,
                    event.event_type(),
                    e
                );
            }
        }
    }

    /// Get the event log (for debugging)
    pub fn get_event_log(&self) -> Vec<EventLogEntry> {
        self.inner
            .event_log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Clear the event log
    pub fn clear_event_log(&self) {
        self.inner
            .event_log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get the number of subscribers for a specific event type
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        let type_id = TypeId::of::<E>();
        let handlers = self
            .inner
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        handlers.get(&type_id).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
