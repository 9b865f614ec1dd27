// src/services/favorite_toggle_service.rs
//
// Optimistic favorite toggling
//
// RULES:
// - The optimistic value is visible while the request is in flight
// - A toggle settles on the server's answer or rolls back; the caller
//   never receives an unconfirmed state
// - One request per event at a time; a second click while pending is
//   answered with the last confirmed state
// - Listeners hear only about confirmed changes
// - No retries

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{debug, info, warn};

use crate::domain::{
    validate_event_id, validate_page_params, FavoritePage, FavoriteRecord, FavoriteState,
    ToggleOutcome, ToggleState,
};
use crate::error::{AppError, AppResult};
use crate::events::FavoriteChangeNotifier;
use crate::repositories::FavoriteRepository;

pub struct FavoriteToggleService {
    favorite_repo: Arc<dyn FavoriteRepository>,
    notifier: Arc<FavoriteChangeNotifier>,
    states: Mutex<HashMap<i64, ToggleState>>,
    /// Known favorite records, newest first
    cache: RwLock<Vec<FavoriteRecord>>,
}

impl FavoriteToggleService {
    pub fn new(
        favorite_repo: Arc<dyn FavoriteRepository>,
        notifier: Arc<FavoriteChangeNotifier>,
    ) -> Self {
        Self {
            favorite_repo,
            notifier,
            states: Mutex::new(HashMap::new()),
            cache: RwLock::new(Vec::new()),
        }
    }

    // ========================================================================
    // TOGGLE
    // ========================================================================

    /// Flip the favorite state of an event.
    ///
    /// `current` is the state the caller is displaying; `favorite_id` the
    /// record to delete when un-favoriting. A missing id is looked up in
    /// the local cache, then on the server.
    pub async fn toggle(
        &self,
        event_id: i64,
        current: bool,
        favorite_id: Option<i64>,
    ) -> AppResult<ToggleOutcome> {
        validate_event_id(event_id).map_err(AppError::Domain)?;

        let favorite_id = if current {
            favorite_id.or_else(|| self.cached_record_id(event_id))
        } else {
            None
        };
        let previous = FavoriteState {
            is_favorite: current,
            favorite_id,
        };

        {
            let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(state) = states.get(&event_id) {
                if state.is_pending() {
                    debug!("Toggle already in flight for event {}", event_id);
                    return Ok(ToggleOutcome::ignored(event_id, state.confirmed()));
                }
            }
            states.insert(event_id, ToggleState::begin(previous));
        }

        // Rolls back if this future is dropped before the request settles
        let guard = PendingToggle {
            service: self,
            event_id,
            previous,
            armed: true,
        };

        let result = if previous.is_favorite {
            self.remove_favorite(event_id, previous).await
        } else {
            self.add_favorite(event_id).await
        };

        guard.disarm();

        match result {
            Ok(confirmed) => {
                // Skip listeners if the state was cleared (logout) meanwhile
                if self.settle(event_id, ToggleState::commit(confirmed)) {
                    self.notifier.notify(event_id, confirmed.is_favorite);
                } else {
                    debug!("Event {} was cleared during its toggle", event_id);
                    self.evict(event_id);
                }
                Ok(ToggleOutcome::new(event_id, confirmed))
            }
            Err(e) => {
                warn!(
                    "Favorite toggle for event {} failed, rolling back to {}: {}",
                    event_id, previous.is_favorite, e
                );
                self.settle(event_id, ToggleState::begin(previous).rollback());
                Err(e)
            }
        }
    }

    async fn add_favorite(&self, event_id: i64) -> AppResult<FavoriteState> {
        let record = self.favorite_repo.add(event_id).await?;
        let favorite_id = record.id;

        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            cache.retain(|existing| existing.event.id != event_id);
            cache.insert(0, record);
        }

        info!("Event {} favorited as record {}", event_id, favorite_id);
        Ok(FavoriteState::favorited(favorite_id))
    }

    async fn remove_favorite(
        &self,
        event_id: i64,
        previous: FavoriteState,
    ) -> AppResult<FavoriteState> {
        let favorite_id = match previous.favorite_id {
            Some(id) => id,
            None => match self.favorite_repo.find_by_event(event_id).await? {
                Some(record) => record.id,
                None => {
                    info!(
                        "Event {} has no favorite record on the server, settling as not favorited",
                        event_id
                    );
                    self.evict(event_id);
                    return Ok(FavoriteState::not_favorited());
                }
            },
        };

        let evicted = self.evict(event_id);

        match self.favorite_repo.remove(favorite_id).await {
            Ok(()) => {
                info!("Favorite record {} for event {} removed", favorite_id, event_id);
                Ok(FavoriteState::not_favorited())
            }
            Err(e) => {
                if let Some((position, record)) = evicted {
                    let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
                    let position = position.min(cache.len());
                    cache.insert(position, record);
                }
                Err(e)
            }
        }
    }

    /// Replace the state for an event unless it was cleared meanwhile.
    /// Returns whether anything was updated.
    fn settle(&self, event_id: i64, next: ToggleState) -> bool {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        match states.get_mut(&event_id) {
            Some(state) => {
                *state = next;
                true
            }
            None => false,
        }
    }

    /// Remove the cached record for an event, keeping its position
    fn evict(&self, event_id: i64) -> Option<(usize, FavoriteRecord)> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let position = cache.iter().position(|record| record.event.id == event_id)?;
        Some((position, cache.remove(position)))
    }

    fn cached_record_id(&self, event_id: i64) -> Option<i64> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|record| record.event.id == event_id)
            .map(|record| record.id)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn state_of(&self, event_id: i64) -> Option<ToggleState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_id)
            .copied()
    }

    /// Value to render right now (optimistic while a toggle is pending)
    pub fn displayed(&self, event_id: i64) -> Option<bool> {
        self.state_of(event_id).map(|state| state.displayed())
    }

    /// Last confirmed value
    pub fn is_favorite(&self, event_id: i64) -> Option<bool> {
        self.state_of(event_id)
            .map(|state| state.confirmed().is_favorite)
    }

    pub fn favorite_id_for(&self, event_id: i64) -> Option<i64> {
        self.state_of(event_id)
            .and_then(|state| state.confirmed().favorite_id)
            .or_else(|| self.cached_record_id(event_id))
    }

    pub fn favorites(&self) -> Vec<FavoriteRecord> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ========================================================================
    // SYNC WITH SERVER
    // ========================================================================

    /// Fetch one page of favorites and adopt it as confirmed state.
    ///
    /// Page 1 replaces the cache; later pages extend it. When the page
    /// holds every favorite, events no longer listed settle as not
    /// favorited. Pending toggles are left alone.
    pub async fn load_favorites(&self, page: u32, per_page: u32) -> AppResult<FavoritePage> {
        validate_page_params(page, per_page).map_err(AppError::Domain)?;

        let result = self.favorite_repo.list(page, per_page).await?;

        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            if page == 1 {
                *cache = result.favorites.clone();
            } else {
                for record in &result.favorites {
                    if !cache.iter().any(|existing| existing.id == record.id) {
                        cache.push(record.clone());
                    }
                }
            }
        }

        {
            let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);

            if result.pagination.is_complete() {
                for (event_id, state) in states.iter_mut() {
                    let listed = result.favorites.iter().any(|r| r.event.id == *event_id);
                    if !state.is_pending() && !listed && state.confirmed().is_favorite {
                        *state = ToggleState::commit(FavoriteState::not_favorited());
                        self.notifier.set_status(*event_id, false);
                    }
                }
            }

            for record in &result.favorites {
                let event_id = record.event.id;
                let pending = states.get(&event_id).is_some_and(|s| s.is_pending());
                if !pending {
                    states.insert(
                        event_id,
                        ToggleState::commit(FavoriteState::favorited(record.id)),
                    );
                    self.notifier.set_status(event_id, true);
                }
            }
        }

        debug!(
            "Loaded favorites page {}/{} ({} records)",
            result.pagination.page,
            result.pagination.pages,
            result.favorites.len()
        );

        Ok(result)
    }

    /// Ask the server whether one event is favorited
    pub async fn resolve_status(&self, event_id: i64) -> AppResult<FavoriteState> {
        validate_event_id(event_id).map_err(AppError::Domain)?;

        let record = self.favorite_repo.find_by_event(event_id).await?;
        let confirmed = match &record {
            Some(record) => FavoriteState::favorited(record.id),
            None => FavoriteState::not_favorited(),
        };

        {
            let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
            let pending = states.get(&event_id).is_some_and(|s| s.is_pending());
            if !pending {
                states.insert(event_id, ToggleState::commit(confirmed));
            }
        }

        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            match record {
                Some(record) if !cache.iter().any(|r| r.id == record.id) => {
                    cache.insert(0, record)
                }
                Some(_) => {}
                None => cache.retain(|r| r.event.id != event_id),
            }
        }

        self.notifier.set_status(event_id, confirmed.is_favorite);
        Ok(confirmed)
    }

    /// Forget everything (logout)
    pub fn clear(&self) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Pending toggle that is rolled back unless disarmed
struct PendingToggle<'a> {
    service: &'a FavoriteToggleService,
    event_id: i64,
    previous: FavoriteState,
    armed: bool,
}

impl PendingToggle<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingToggle<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(
                "Favorite toggle for event {} was cancelled, rolling back to {}",
                self.event_id, self.previous.is_favorite
            );
            self.service
                .settle(self.event_id, ToggleState::begin(self.previous).rollback());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventStatus, EventSummary, Pagination};
    use crate::repositories::MockFavoriteRepository;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn record(id: i64, event_id: i64) -> FavoriteRecord {
        FavoriteRecord {
            id,
            user: None,
            event: EventSummary {
                id: event_id,
                title: format!("Event {}", event_id),
                summary: None,
                start_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
                location: "Seoul".to_string(),
                image_urls: Vec::new(),
                status: EventStatus::Approved,
                average_rating: 0.0,
            },
            created_at: NaiveDate::from_ymd_opt(2025, 5, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    fn server_error() -> AppError {
        AppError::Api {
            status: 500,
            code: None,
            message: "Internal Server Error".to_string(),
        }
    }

    fn service(repo: MockFavoriteRepository) -> (FavoriteToggleService, Arc<FavoriteChangeNotifier>) {
        let notifier = Arc::new(FavoriteChangeNotifier::default());
        let service = FavoriteToggleService::new(Arc::new(repo), Arc::clone(&notifier));
        (service, notifier)
    }

    fn counting_listener(notifier: &FavoriteChangeNotifier) -> (Arc<Mutex<Vec<(i64, bool)>>>, crate::events::Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sub = notifier.subscribe(move |event_id, is_favorite| {
            seen_clone.lock().unwrap().push((event_id, is_favorite));
        });
        (seen, sub)
    }

    #[tokio::test]
    async fn test_add_adopts_server_record_id() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_add()
            .with(eq(42))
            .times(1)
            .returning(|_| Ok(record(7, 42)));
        let (service, notifier) = service(repo);
        let (seen, _sub) = counting_listener(&notifier);

        let outcome = service.toggle(42, false, None).await.unwrap();

        assert!(outcome.is_favorite);
        assert_eq!(outcome.favorite_id, Some(7));
        assert_eq!(service.is_favorite(42), Some(true));
        assert_eq!(service.favorites()[0].id, 7);
        assert_eq!(*seen.lock().unwrap(), vec![(42, true)]);
    }

    #[tokio::test]
    async fn test_remove_deletes_given_record() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_remove()
            .with(eq(7))
            .times(1)
            .returning(|_| Ok(()));
        let (service, notifier) = service(repo);
        let (seen, _sub) = counting_listener(&notifier);

        let outcome = service.toggle(42, true, Some(7)).await.unwrap();

        assert!(!outcome.is_favorite);
        assert_eq!(outcome.favorite_id, None);
        assert_eq!(service.is_favorite(42), Some(false));
        assert_eq!(*seen.lock().unwrap(), vec![(42, false)]);
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_add().returning(|_| Ok(record(7, 42)));
        repo.expect_remove().with(eq(7)).returning(|_| Ok(()));
        let (service, _notifier) = service(repo);

        let added = service.toggle(42, false, None).await.unwrap();
        let removed = service
            .toggle(42, added.is_favorite, added.favorite_id)
            .await
            .unwrap();

        assert!(!removed.is_favorite);
        assert!(service.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_add().times(1).returning(|_| Err(server_error()));
        let (service, notifier) = service(repo);
        let (seen, _sub) = counting_listener(&notifier);

        let err = service.toggle(42, false, None).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(
            service.state_of(42),
            Some(ToggleState::Settled(FavoriteState::not_favorited()))
        );
        assert_eq!(service.displayed(42), Some(false));
        assert!(service.favorites().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_remove_restores_record() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_list().returning(|_, _| {
            Ok(FavoritePage {
                favorites: vec![record(9, 50), record(7, 42)],
                pagination: Pagination { page: 1, per_page: 20, total: 2, pages: 1 },
            })
        });
        repo.expect_remove().with(eq(7)).returning(|_| Err(server_error()));
        let (service, _notifier) = service(repo);
        service.load_favorites(1, 20).await.unwrap();

        let result = service.toggle(42, true, None).await;

        assert!(result.is_err());
        assert_eq!(service.is_favorite(42), Some(true));
        assert_eq!(service.favorite_id_for(42), Some(7));
        let ids: Vec<i64> = service.favorites().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 7]);
    }

    #[tokio::test]
    async fn test_invalid_event_id_makes_no_request() {
        let repo = MockFavoriteRepository::new();
        let (service, _notifier) = service(repo);

        let err = service.toggle(0, false, None).await.unwrap_err();

        assert!(matches!(err, AppError::Domain(_)));
        assert!(service.state_of(0).is_none());
    }

    #[tokio::test]
    async fn test_missing_record_id_is_looked_up() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_find_by_event()
            .with(eq(42))
            .times(1)
            .returning(|_| Ok(Some(record(7, 42))));
        repo.expect_remove().with(eq(7)).times(1).returning(|_| Ok(()));
        let (service, _notifier) = service(repo);

        let outcome = service.toggle(42, true, None).await.unwrap();

        assert!(!outcome.is_favorite);
    }

    #[tokio::test]
    async fn test_missing_record_on_server_settles_not_favorited() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_find_by_event().returning(|_| Ok(None));
        repo.expect_remove().never();
        let (service, _notifier) = service(repo);

        let outcome = service.toggle(42, true, None).await.unwrap();

        assert!(!outcome.is_favorite);
        assert_eq!(service.is_favorite(42), Some(false));
    }

    #[tokio::test]
    async fn test_complete_page_clears_unlisted_favorites() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_add().returning(|_| Ok(record(3, 11)));
        repo.expect_list().returning(|_, per_page| Ok(FavoritePage::empty(per_page)));
        let (service, notifier) = service(repo);

        service.toggle(11, false, None).await.unwrap();
        assert_eq!(notifier.status(11), Some(true));

        let page = service.load_favorites(1, 20).await.unwrap();

        assert!(page.favorites.is_empty());
        assert_eq!(service.is_favorite(11), Some(false));
        assert_eq!(notifier.status(11), Some(false));
    }

    #[tokio::test]
    async fn test_load_favorites_rejects_bad_page_size() {
        let repo = MockFavoriteRepository::new();
        let (service, _notifier) = service(repo);

        assert!(service.load_favorites(1, 0).await.is_err());
        assert!(service.load_favorites(1, 101).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_status_updates_state() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_find_by_event()
            .with(eq(42))
            .returning(|_| Ok(Some(record(7, 42))));
        let (service, notifier) = service(repo);

        let state = service.resolve_status(42).await.unwrap();

        assert_eq!(state, FavoriteState::favorited(7));
        assert_eq!(service.favorite_id_for(42), Some(7));
        assert_eq!(notifier.status(42), Some(true));
    }

    #[tokio::test]
    async fn test_clear_forgets_everything() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_add().returning(|_| Ok(record(7, 42)));
        let (service, _notifier) = service(repo);
        service.toggle(42, false, None).await.unwrap();

        service.clear();

        assert!(service.state_of(42).is_none());
        assert!(service.favorites().is_empty());
    }

    /// Holds every `add` until released
    struct GatedRepository {
        gate: Notify,
        adds: AtomicUsize,
    }

    #[async_trait]
    impl FavoriteRepository for GatedRepository {
        async fn list(&self, _page: u32, per_page: u32) -> AppResult<FavoritePage> {
            Ok(FavoritePage::empty(per_page))
        }

        async fn find_by_event(&self, _event_id: i64) -> AppResult<Option<FavoriteRecord>> {
            Ok(None)
        }

        async fn add(&self, event_id: i64) -> AppResult<FavoriteRecord> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(record(7, event_id))
        }

        async fn remove(&self, _favorite_id: i64) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_second_toggle_while_pending_is_ignored() {
        let repo = Arc::new(GatedRepository {
            gate: Notify::new(),
            adds: AtomicUsize::new(0),
        });
        let notifier = Arc::new(FavoriteChangeNotifier::default());
        let service = Arc::new(FavoriteToggleService::new(
            Arc::clone(&repo) as Arc<dyn FavoriteRepository>,
            notifier,
        ));

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.toggle(42, false, None).await })
        };

        while repo.adds.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(service.displayed(42), Some(true));

        let second = service.toggle(42, false, None).await.unwrap();
        assert!(!second.is_favorite);
        assert!(!second.changed);
        assert_eq!(repo.adds.load(Ordering::SeqCst), 1);

        repo.gate.notify_one();
        let first = first.await.unwrap().unwrap();

        assert!(first.is_favorite);
        assert_eq!(service.state_of(42).map(|s| s.is_pending()), Some(false));
    }

    fn gated() -> (Arc<GatedRepository>, Arc<FavoriteToggleService>, Arc<FavoriteChangeNotifier>) {
        let repo = Arc::new(GatedRepository {
            gate: Notify::new(),
            adds: AtomicUsize::new(0),
        });
        let notifier = Arc::new(FavoriteChangeNotifier::default());
        let service = Arc::new(FavoriteToggleService::new(
            Arc::clone(&repo) as Arc<dyn FavoriteRepository>,
            Arc::clone(&notifier),
        ));
        (repo, service, notifier)
    }

    #[tokio::test]
    async fn test_cancelled_toggle_rolls_back() {
        let (repo, service, notifier) = gated();
        let (seen, _sub) = counting_listener(&notifier);

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            service.toggle(42, false, None),
        )
        .await;

        assert!(timed_out.is_err());
        assert_eq!(
            service.state_of(42),
            Some(ToggleState::Settled(FavoriteState::not_favorited()))
        );
        assert_eq!(service.displayed(42), Some(false));

        // The next click sends a fresh request instead of being ignored
        let retry = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.toggle(42, false, None).await })
        };
        while repo.adds.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        repo.gate.notify_one();
        let retried = retry.await.unwrap().unwrap();

        assert!(retried.changed);
        assert!(retried.is_favorite);
        assert_eq!(repo.adds.load(Ordering::SeqCst), 2);
        assert_eq!(seen.lock().unwrap().as_slice(), &[(42, true)]);
    }

    #[tokio::test]
    async fn test_clear_during_toggle_skips_listeners() {
        let (repo, service, notifier) = gated();
        let (seen, _sub) = counting_listener(&notifier);

        let pending = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.toggle(42, false, None).await })
        };
        while repo.adds.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        service.clear();
        repo.gate.notify_one();
        let outcome = pending.await.unwrap().unwrap();

        assert!(outcome.is_favorite);
        assert!(service.state_of(42).is_none());
        assert!(service.favorites().is_empty());
        assert_eq!(notifier.status(42), None);
        assert!(seen.lock().unwrap().is_empty());
    }
}
