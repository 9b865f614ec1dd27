// src/application/state.rs
//
// Composition root. One AppState per signed-in UI session; the refresh
// registry and notifier live exactly as long as it does.

use std::sync::Arc;

use log::info;

use crate::config::ClientConfig;
use crate::domain::MonthRange;
use crate::error::AppResult;
use crate::events::{EventBus, FavoriteChangeNotifier};
use crate::integrations::MoaplayClient;
use crate::repositories::{FavoriteRepository, ScheduleRepository};
use crate::services::{
    AuthContext, CalendarCoordinator, CalendarView, FavoriteToggleService, RefreshRegistry,
};

/// Application state shared with the UI shell.
/// All fields are Arc-wrapped for thread-safe sharing across commands.
pub struct AppState {
    pub config: ClientConfig,
    pub event_bus: Arc<EventBus>,
    pub auth: Arc<AuthContext>,
    pub refresh_registry: Arc<RefreshRegistry>,
    pub notifier: Arc<FavoriteChangeNotifier>,
    pub calendar_coordinator: Arc<CalendarCoordinator>,
    pub favorite_service: Arc<FavoriteToggleService>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
}

impl AppState {
    /// Wire everything against the REST backend named in `config`
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        config.validate()?;
        let client = Arc::new(MoaplayClient::new(&config)?);
        info!("Using backend at {}", client.base_url());

        Ok(Self::with_repositories(
            config,
            Arc::clone(&client) as Arc<dyn FavoriteRepository>,
            client as Arc<dyn ScheduleRepository>,
        ))
    }

    pub fn with_repositories(
        config: ClientConfig,
        favorite_repo: Arc<dyn FavoriteRepository>,
        schedule_repo: Arc<dyn ScheduleRepository>,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let notifier = Arc::new(FavoriteChangeNotifier::new(EventBus::clone(&event_bus)));
        let refresh_registry = Arc::new(RefreshRegistry::new());

        let calendar_coordinator = Arc::new(CalendarCoordinator::new(
            Arc::clone(&refresh_registry),
            Arc::clone(&event_bus),
        ));

        let favorite_service = Arc::new(FavoriteToggleService::new(
            favorite_repo,
            Arc::clone(&notifier),
        ));

        Self {
            config,
            event_bus,
            auth: Arc::new(AuthContext::new()),
            refresh_registry,
            notifier,
            calendar_coordinator,
            favorite_service,
            schedule_repo,
        }
    }

    /// Mount a calendar view for `range`; it is refreshed by every
    /// favorite change until dropped.
    pub fn mount_calendar(&self, range: MonthRange) -> CalendarView {
        CalendarView::mount(
            &self.refresh_registry,
            Arc::clone(&self.schedule_repo),
            Arc::clone(&self.auth),
            range,
        )
    }
}
