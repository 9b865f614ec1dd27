// src/domain/mod.rs
//
// Domain Root
//
// Declares every domain module and re-exports its public API.
// Other modules import from `crate::domain::*`.

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod event;
pub mod favorite;
pub mod schedule;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Events
pub use event::{EventStatus, EventSummary, UserSummary};

// Favorites
pub use favorite::{
    validate_event_id, validate_page_params, FavoritePage, FavoriteRecord, FavoriteState,
    Pagination, ToggleOutcome, ToggleState, MAX_PAGE_SIZE,
};

// Schedules
pub use schedule::{MonthRange, ScheduleItem, ScheduleQuery};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
