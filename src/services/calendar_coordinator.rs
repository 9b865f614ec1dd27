// src/services/calendar_coordinator.rs
//
// Fans a favorite change out to every mounted calendar.
//
// The coordinator holds no state of its own; the registry decides what
// gets refreshed.

use std::sync::{Arc, Weak};

use log::{debug, info};

use crate::events::{CalendarsRefreshed, EventBus, FavoriteChangeNotifier, Subscription};
use crate::services::refresh_registry::{RefreshRegistry, RefreshReport};

pub struct CalendarCoordinator {
    registry: Arc<RefreshRegistry>,
    event_bus: Arc<EventBus>,
}

impl CalendarCoordinator {
    pub fn new(registry: Arc<RefreshRegistry>, event_bus: Arc<EventBus>) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    /// Refresh every registered calendar and wait for all of them.
    /// Completes even when individual refreshes fail.
    pub async fn on_favorite_change(&self, event_id: i64) -> RefreshReport {
        info!("Favorite changed for event {}, refreshing calendars", event_id);

        let report = self.registry.refresh_all().await;

        self.event_bus.emit(CalendarsRefreshed::new(
            Some(event_id),
            report.attempted,
            report.failed,
        ));

        report
    }

    pub async fn refresh_all(&self) -> RefreshReport {
        let report = self.registry.refresh_all().await;
        self.event_bus
            .emit(CalendarsRefreshed::new(None, report.attempted, report.failed));
        report
    }

    pub fn registry(&self) -> &Arc<RefreshRegistry> {
        &self.registry
    }

    /// Refresh calendars in the background whenever the notifier fires.
    ///
    /// For callers that notify without awaiting the coordinator. The
    /// coordinator is held weakly; once it is dropped notifications are
    /// ignored.
    pub fn attach(
        self: &Arc<Self>,
        notifier: &FavoriteChangeNotifier,
        runtime: tokio::runtime::Handle,
    ) -> Subscription {
        let coordinator: Weak<Self> = Arc::downgrade(self);

        notifier.subscribe(move |event_id, _is_favorite| {
            let Some(coordinator) = coordinator.upgrade() else {
                debug!("Coordinator gone, ignoring change for event {}", event_id);
                return;
            };
            runtime.spawn(async move {
                coordinator.on_favorite_change(event_id).await;
            });
        })
    }
}
