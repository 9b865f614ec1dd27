// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod auth_context;
pub mod calendar_coordinator;
pub mod calendar_view;
pub mod favorite_toggle_service;
pub mod refresh_registry;

// Re-export all services and their types
pub use auth_context::{AuthContext, SessionUser};

pub use calendar_coordinator::CalendarCoordinator;

pub use calendar_view::CalendarView;

pub use favorite_toggle_service::FavoriteToggleService;

pub use refresh_registry::{
    RefreshFn,
    RefreshFuture,
    RefreshRegistration,
    RefreshRegistry,
    RefreshReport,
};
