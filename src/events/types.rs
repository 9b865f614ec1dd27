// src/events/types.rs
//
// Domain events published on the EventBus.
// Each event represents an immutable fact that has already occurred.
//
// RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react
// - Events are never persisted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone + Send + Sync {
    /// Unique identifier for this notification
    fn id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// FAVORITE EVENTS
// ============================================================================

/// Emitted after the server confirmed a favorite add or removal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteChanged {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// Platform event whose favorite state changed
    pub event_id: i64,
    pub is_favorite: bool,
}

impl FavoriteChanged {
    pub fn new(event_id: i64, is_favorite: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_id,
            is_favorite,
        }
    }
}

impl DomainEvent for FavoriteChanged {
    fn id(&self) -> Uuid { self.id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "FavoriteChanged" }
}

// ============================================================================
// CALENDAR EVENTS
// ============================================================================

/// Emitted when a broadcast refresh of all calendar views finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarsRefreshed {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// Favorite change that triggered the refresh, if any
    pub trigger_event_id: Option<i64>,
    pub attempted: usize,
    pub failed: usize,
}

impl CalendarsRefreshed {
    pub fn new(trigger_event_id: Option<i64>, attempted: usize, failed: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            trigger_event_id,
            attempted,
            failed,
        }
    }
}

impl DomainEvent for CalendarsRefreshed {
    fn id(&self) -> Uuid { self.id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CalendarsRefreshed" }
}
