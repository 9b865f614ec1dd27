// src/services/calendar_view.rs
//
// View model behind one mounted calendar.
//
// A view registers its reload with the refresh registry when mounted
// and unregisters when unmounted or dropped. A reload that finishes
// after unmount, or after a newer reload started, is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::NaiveDate;
use log::{debug, warn};

use crate::domain::{MonthRange, ScheduleItem, ScheduleQuery};
use crate::error::AppResult;
use crate::repositories::ScheduleRepository;
use crate::services::auth_context::AuthContext;
use crate::services::refresh_registry::{RefreshRegistration, RefreshRegistry};

#[derive(Debug, Clone, Default)]
struct CalendarViewState {
    range: MonthRange,
    entries: Vec<ScheduleItem>,
    loading: bool,
    last_error: Option<String>,
    /// Bumped by every reload; only the latest may store its result
    generation: u64,
}

struct ViewShared {
    schedule_repo: Arc<dyn ScheduleRepository>,
    auth: Arc<AuthContext>,
    state: Mutex<CalendarViewState>,
    mounted: AtomicBool,
}

impl ViewShared {
    fn lock(&self) -> std::sync::MutexGuard<'_, CalendarViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn reload(&self) -> AppResult<()> {
        if !self.mounted.load(Ordering::SeqCst) {
            return Ok(());
        }

        if !self.auth.is_authenticated() {
            let mut state = self.lock();
            state.generation += 1;
            state.entries.clear();
            state.loading = false;
            state.last_error = None;
            return Ok(());
        }

        let (generation, range) = {
            let mut state = self.lock();
            state.generation += 1;
            state.loading = true;
            (state.generation, state.range)
        };

        let result = self.schedule_repo.list(ScheduleQuery::Month(range)).await;

        if !self.mounted.load(Ordering::SeqCst) {
            debug!("Calendar view unmounted during reload, discarding result");
            return result.map(|_| ());
        }

        let mut state = self.lock();
        if state.generation != generation {
            debug!("Discarding stale calendar reload {}", generation);
            return result.map(|_| ());
        }
        state.loading = false;

        match result {
            Ok(entries) => {
                debug!(
                    "Calendar {}-{:02} loaded {} schedule(s)",
                    range.year,
                    range.month,
                    entries.len()
                );
                state.entries = entries;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Calendar {}-{:02} failed to load: {}", range.year, range.month, e);
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

pub struct CalendarView {
    shared: Arc<ViewShared>,
    registration: RefreshRegistration,
}

impl CalendarView {
    /// Register the view with `registry`. Nothing is fetched until the
    /// first `refresh` or broadcast.
    pub fn mount(
        registry: &RefreshRegistry,
        schedule_repo: Arc<dyn ScheduleRepository>,
        auth: Arc<AuthContext>,
        range: MonthRange,
    ) -> Self {
        let shared = Arc::new(ViewShared {
            schedule_repo,
            auth,
            state: Mutex::new(CalendarViewState {
                range,
                ..CalendarViewState::default()
            }),
            mounted: AtomicBool::new(true),
        });

        let weak: Weak<ViewShared> = Arc::downgrade(&shared);
        let registration = registry.register(move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(shared) => shared.reload().await,
                    None => Ok(()),
                }
            }
        });

        debug!("Calendar view mounted for {}-{:02}", range.year, range.month);

        Self {
            shared,
            registration,
        }
    }

    pub async fn refresh(&self) -> AppResult<()> {
        self.shared.reload().await
    }

    /// Switch month and reload
    pub async fn set_range(&self, range: MonthRange) -> AppResult<()> {
        self.shared.lock().range = range;
        self.refresh().await
    }

    pub fn range(&self) -> MonthRange {
        self.shared.lock().range
    }

    pub fn entries(&self) -> Vec<ScheduleItem> {
        self.shared.lock().entries.clone()
    }

    /// Schedule entries whose event runs on `date`
    pub fn events_on(&self, date: NaiveDate) -> Vec<ScheduleItem> {
        self.shared
            .lock()
            .entries
            .iter()
            .filter(|item| item.event.covers(date))
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().last_error.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        if self.shared.mounted.swap(false, Ordering::SeqCst) {
            self.registration.unregister();
            debug!("Calendar view unmounted");
        }
    }
}

impl Drop for CalendarView {
    fn drop(&mut self) {
        self.unmount();
    }
}
