// src/services/refresh_registry.rs
//
// Calendar refresh registry
//
// RULES:
// - Owned by one AppState; starts empty, dropped with it
// - One entry per registration; the handle removes it (explicitly or on drop)
// - refresh_all runs every entry concurrently and never fails
// - The live set is snapshotted before awaiting, so registering or
//   unregistering during a broadcast only affects later broadcasts

use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub type RefreshFuture = BoxFuture<'static, AppResult<()>>;

/// Reloads one view's data. Each call starts an independent reload.
pub type RefreshFn = Arc<dyn Fn() -> RefreshFuture + Send + Sync>;

/// Outcome of one broadcast. `failed` counts entries that returned an
/// error or panicked; the broadcast itself always completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub attempted: usize,
    pub failed: usize,
}

impl RefreshReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

struct RegistryInner {
    functions: Mutex<BTreeMap<u64, RefreshFn>>,
    next_token: AtomicU64,
}

impl RegistryInner {
    fn remove(&self, token: u64) -> bool {
        self.functions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token)
            .is_some()
    }
}

pub struct RefreshRegistry {
    inner: Arc<RegistryInner>,
}

/// Deregistration handle returned by [`RefreshRegistry::register`].
///
/// `unregister` may be called any number of times; only the first call
/// has an effect. Dropping the handle unregisters.
pub struct RefreshRegistration {
    registry: Weak<RegistryInner>,
    token: u64,
    active: AtomicBool,
}

impl RefreshRegistration {
    pub fn unregister(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.token) {
                debug!("Unregistered refresh function {}", self.token);
            }
        }
    }

    pub fn is_registered(&self) -> bool {
        self.active.load(Ordering::SeqCst) && self.registry.strong_count() > 0
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

impl Drop for RefreshRegistration {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for RefreshRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRegistration")
            .field("token", &self.token)
            .field("registered", &self.is_registered())
            .finish()
    }
}

impl RefreshRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                functions: Mutex::new(BTreeMap::new()),
                next_token: AtomicU64::new(1),
            }),
        }
    }

    /// Add a refresh function to the live set
    pub fn register<F, Fut>(&self, refresh: F) -> RefreshRegistration
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.register_boxed(Arc::new(move || refresh().boxed()))
    }

    pub fn register_boxed(&self, refresh: RefreshFn) -> RefreshRegistration {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner
            .functions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, refresh);

        debug!("Registered refresh function {}", token);

        RefreshRegistration {
            registry: Arc::downgrade(&self.inner),
            token,
            active: AtomicBool::new(true),
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .functions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered function concurrently and wait until all
    /// of them settled. Failures and panics are logged per function and
    /// counted, never propagated.
    pub async fn refresh_all(&self) -> RefreshReport {
        let snapshot: Vec<(u64, RefreshFn)> = self
            .inner
            .functions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(token, refresh)| (*token, Arc::clone(refresh)))
            .collect();

        if snapshot.is_empty() {
            return RefreshReport::default();
        }

        let attempted = snapshot.len();
        info!("Refreshing {} calendar view(s)", attempted);

        let runs = snapshot.into_iter().map(|(token, refresh)| async move {
            // Calling `refresh` inside the async block puts synchronous
            // panics under catch_unwind too
            let outcome = AssertUnwindSafe(async move { refresh().await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!("Calendar refresh {} failed: {}", token, e);
                    false
                }
                Err(_) => {
                    error!("Calendar refresh {} panicked", token);
                    false
                }
            }
        });

        let failed = join_all(runs).await.into_iter().filter(|ok| !ok).count();

        RefreshReport { attempted, failed }
    }
}

impl Default for RefreshRegistry {
    fn default() -> Self {
        Self::new()
    }
}
