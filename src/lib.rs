// src/lib.rs
// moaplay-sync - Favorite and calendar synchronization for the moaplay client
//
// Architecture:
// - Domain-centric: favorite and schedule rules live in domains
// - Event-driven: favorite changes fan out through the notifier
// - Explicit: the refresh registry is an owned object, never a global
// - Remote-first: the backend is the source of truth; local state is a cache
// - Application Layer: UI boundary (AppState + commands)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    validate_event_id,
    validate_page_params,
    // Events
    EventStatus,
    EventSummary,
    // Favorites
    FavoritePage,
    FavoriteRecord,
    FavoriteState,
    // Schedules
    MonthRange,
    Pagination,
    ScheduleItem,
    ScheduleQuery,
    ToggleOutcome,
    ToggleState,
    UserSummary,
};

// ============================================================================
// PUBLIC API - Configuration & Errors
// ============================================================================

pub use config::ClientConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    CalendarsRefreshed,
    DomainEvent,
    EventBus,
    EventLogEntry,
    FavoriteChangeNotifier,
    FavoriteChanged,
    Subscription,
};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{FavoriteRepository, ScheduleRepository};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AuthContext,
    CalendarCoordinator,
    CalendarView,
    FavoriteToggleService,
    RefreshFn,
    RefreshFuture,
    RefreshRegistration,
    RefreshRegistry,
    RefreshReport,
    SessionUser,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, ErrorResponse, ErrorType, ToErrorResponse};

// Re-export application submodules
pub use application::commands;
pub use application::dto;

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::MoaplayClient;
