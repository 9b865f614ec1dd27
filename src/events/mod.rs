// src/events/mod.rs
//
// Internal Event System - Public API
//
// EventHandler is internal to the bus and is NOT exported.

pub mod bus;
pub mod notifier;
pub mod types;

pub use types::{CalendarsRefreshed, DomainEvent, FavoriteChanged};

pub use bus::{EventBus, EventLogEntry, Subscription};

pub use notifier::FavoriteChangeNotifier;

/// Create a fresh, empty event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
