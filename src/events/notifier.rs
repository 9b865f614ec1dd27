// src/events/notifier.rs
//
// Favorite change notifier.
//
// Any component announces "favorite state of event X is now Y"; other
// components (calendar coordinator, list views) react. Delivery is
// synchronous, at-most-once and only to handlers subscribed at notify
// time. Nothing is queued for later subscribers.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use log::info;

use crate::events::bus::{EventBus, Subscription};
use crate::events::types::FavoriteChanged;

pub struct FavoriteChangeNotifier {
    bus: EventBus,
    /// Latest known status per event, as last notified or set
    statuses: RwLock<HashMap<i64, bool>>,
}

impl FavoriteChangeNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            statuses: RwLock::new(HashMap::new()),
        }
    }

    /// Record the new status and dispatch to current subscribers.
    /// A notification with no subscribers is a no-op apart from the
    /// status update.
    pub fn notify(&self, event_id: i64, is_favorite: bool) {
        self.set_status(event_id, is_favorite);
        info!(
            "Favorite status changed for event {}: {}",
            event_id, is_favorite
        );
        self.bus.emit(FavoriteChanged::new(event_id, is_favorite));
    }

    /// Listen for every favorite change
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(i64, bool) + Send + Sync + 'static,
    {
        self.bus
            .subscribe::<FavoriteChanged, _>(move |event| listener(event.event_id, event.is_favorite))
    }

    /// Listen for changes to one event only
    pub fn subscribe_event<F>(&self, event_id: i64, listener: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.subscribe(move |changed_id, is_favorite| {
            if changed_id == event_id {
                listener(is_favorite);
            }
        })
    }

    /// Last known status; None if never notified or set
    pub fn status(&self, event_id: i64) -> Option<bool> {
        self.statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_id)
            .copied()
    }

    /// Record a status without dispatching (e.g. after an initial load)
    pub fn set_status(&self, event_id: i64, is_favorite: bool) {
        self.statuses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event_id, is_favorite);
    }

    pub fn clear_statuses(&self) {
        self.statuses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count::<FavoriteChanged>()
    }
}

impl Default for FavoriteChangeNotifier {
    fn default() -> Self {
        Self::new(EventBus::new())
    }
}
