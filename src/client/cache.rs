// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side plan cache.
//!
//! States: `Empty -> Fresh -> Stale -> Empty` (on invalidation), with a
//! fetch possibly in flight in any of them.
//!
//! - At most one network fetch is in flight; concurrent callers join it.
//! - The fetch runs on its own task and writes the cache itself, so a
//!   caller that stops awaiting does not cancel it.
//! - A fetch that started before `invalidate()` never populates the cache.
//! - A failed fetch leaves the previous value in place.
//! - If the cache lock is poisoned, fetches go straight to the network.
//!
//! Only this type mutates its own state.

use crate::client::error::ClientError;
use crate::models::{PlanResponse, PlanTargets};
use crate::services::change::is_significant_since;
use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Where the cache gets plans from.
pub trait PlanSource: Send + Sync + 'static {
    fn fetch_plan(
        &self,
        force_recompute: bool,
    ) -> impl Future<Output = Result<PlanResponse, ClientError>> + Send;
}

/// A plan as held by the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPlan {
    pub targets: PlanTargets,
    /// Value replaced by the last recompute; kept for one cycle only
    pub previous_targets: Option<PlanTargets>,
    pub fetched_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub metrics_version: Option<i64>,
    fetched: Instant,
}

impl CachedPlan {
    pub(crate) fn new(response: PlanResponse, previous_targets: Option<PlanTargets>) -> Self {
        Self {
            targets: response.targets,
            previous_targets,
            fetched_at: Utc::now(),
            generated_at: response.generated_at,
            metrics_version: response.metrics_version,
            fetched: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.fetched.elapsed()
    }

    /// Whether the last recompute moved calories or protein past the
    /// notification thresholds.
    pub fn significant_change(&self) -> bool {
        is_significant_since(self.previous_targets.as_ref(), &self.targets)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

type SharedFetch = Shared<BoxFuture<'static, Result<CachedPlan, ClientError>>>;

struct InFlight {
    id: u64,
    forced: bool,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Inner {
    entry: Option<CachedPlan>,
    in_flight: Option<InFlight>,
    /// Bumped by every invalidation
    generation: u64,
    next_fetch_id: u64,
}

enum Next {
    Join(SharedFetch),
    /// A plain fetch is in flight but the caller needs a forced one
    WaitThenRetry(SharedFetch),
    /// Cache lock unusable
    Bypass(ClientError),
}

pub struct PlanCache<S> {
    source: Arc<S>,
    ttl: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl<S> Clone for PlanCache<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            ttl: self.ttl,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PlanSource> PlanCache<S> {
    pub fn new(source: Arc<S>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, ClientError> {
        self.inner.lock().map_err(|_| ClientError::CacheUnavailable)
    }

    /// Return the plan, from cache when fresh.
    ///
    /// `force_recompute` always reaches the server.
    pub async fn fetch(&self, force_recompute: bool) -> Result<CachedPlan, ClientError> {
        loop {
            let next = match self.lock() {
                Ok(mut inner) => {
                    if !force_recompute {
                        if let Some(entry) = inner.entry.as_ref().filter(|e| e.age() < self.ttl) {
                            return Ok(entry.clone());
                        }
                    }

                    let running = inner
                        .in_flight
                        .as_ref()
                        .map(|f| (f.forced, f.fetch.clone()));
                    match running {
                        Some((forced, fetch)) if forced || !force_recompute => Next::Join(fetch),
                        Some((_, fetch)) => Next::WaitThenRetry(fetch),
                        None => Next::Join(self.start(&mut inner, force_recompute)),
                    }
                }
                Err(e) => Next::Bypass(e),
            };

            match next {
                Next::Join(fetch) => return fetch.await,
                Next::WaitThenRetry(fetch) => {
                    let _ = fetch.await;
                }
                Next::Bypass(e) => {
                    tracing::warn!(error = %e, "Plan cache unavailable, fetching directly");
                    return self.fetch_uncached(force_recompute).await;
                }
            }
        }
    }

    /// Same as `fetch(true)`.
    pub async fn recompute(&self) -> Result<CachedPlan, ClientError> {
        self.fetch(true).await
    }

    /// `fetch` bounded by a caller-chosen timeout.
    ///
    /// On timeout the cache is left as it was; the underlying fetch keeps
    /// running for other waiters.
    pub async fn fetch_with_timeout(
        &self,
        force_recompute: bool,
        timeout: Duration,
    ) -> Result<CachedPlan, ClientError> {
        tokio::time::timeout(timeout, self.fetch(force_recompute))
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    /// Drop the cached plan and detach any in-flight fetch.
    ///
    /// Also recovers a poisoned cache.
    pub fn invalidate(&self) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => {
                tracing::warn!("Resetting poisoned plan cache");
                self.inner.clear_poison();
                poisoned.into_inner()
            }
        };

        inner.entry = None;
        inner.in_flight = None;
        inner.generation += 1;
    }

    /// Cached plan regardless of freshness, for display until a refresh
    /// lands.
    pub fn current(&self) -> Option<CachedPlan> {
        self.lock().ok().and_then(|inner| inner.entry.clone())
    }

    pub fn state(&self) -> CacheState {
        match self.lock() {
            Ok(inner) => match &inner.entry {
                None => CacheState::Empty,
                Some(entry) if entry.age() < self.ttl => CacheState::Fresh,
                Some(_) => CacheState::Stale,
            },
            Err(_) => CacheState::Empty,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.lock().is_ok_and(|inner| inner.in_flight.is_some())
    }

    /// Re-fetch in the background whenever the cached plan goes stale.
    ///
    /// The loop stops when the returned task is dropped.
    pub fn watch_staleness(&self, interval: Duration) -> RefreshTask {
        let cache = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if cache.state() != CacheState::Stale || cache.is_fetching() {
                    continue;
                }

                tracing::debug!("Cached plan is stale, refreshing in background");
                if let Err(e) = cache.fetch(false).await {
                    tracing::warn!(error = %e, "Background plan refresh failed");
                }
            }
        });

        RefreshTask { handle }
    }

    fn start(&self, inner: &mut Inner, forced: bool) -> SharedFetch {
        inner.next_fetch_id += 1;
        let id = inner.next_fetch_id;
        let generation = inner.generation;

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            // Frees the slot even if the fetch panics or the task is aborted
            let _slot = SlotGuard {
                state: Arc::clone(&state),
                id,
            };
            let result = source.fetch_plan(forced).await;
            complete(&state, id, generation, forced, result)
        });

        let fetch = async move {
            handle.await.unwrap_or_else(|e| {
                Err(ClientError::Network(format!("Plan fetch task failed: {}", e)))
            })
        }
        .boxed()
        .shared();

        inner.in_flight = Some(InFlight {
            id,
            forced,
            fetch: fetch.clone(),
        });
        fetch
    }

    async fn fetch_uncached(&self, force_recompute: bool) -> Result<CachedPlan, ClientError> {
        let response = self.source.fetch_plan(force_recompute).await?;
        let previous = if force_recompute {
            response.previous_targets
        } else {
            None
        };
        Ok(CachedPlan::new(response, previous))
    }
}

/// Clears the in-flight slot of fetch `id` when its task ends.
struct SlotGuard {
    state: Arc<Mutex<Inner>>,
    id: u64,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let Ok(mut inner) = self.state.lock() else {
            return;
        };
        if inner.in_flight.as_ref().is_some_and(|f| f.id == self.id) {
            inner.in_flight = None;
        }
    }
}

/// Finish fetch `id`: clear the in-flight slot and store the result unless
/// the cache was invalidated in the meantime.
fn complete(
    state: &Mutex<Inner>,
    id: u64,
    generation: u64,
    forced: bool,
    result: Result<PlanResponse, ClientError>,
) -> Result<CachedPlan, ClientError> {
    let Ok(mut inner) = state.lock() else {
        let response = result?;
        let previous = response.previous_targets.filter(|_| forced);
        return Ok(CachedPlan::new(response, previous));
    };

    if inner.in_flight.as_ref().is_some_and(|f| f.id == id) {
        inner.in_flight = None;
    }

    let response = result?;

    let previous = if forced {
        inner
            .entry
            .as_ref()
            .map(|e| e.targets)
            .or(response.previous_targets)
    } else {
        None
    };
    let plan = CachedPlan::new(response, previous);

    if inner.generation == generation {
        inner.entry = Some(plan.clone());
    } else {
        tracing::debug!("Discarding plan fetched before invalidation");
    }

    Ok(plan)
}

/// Handle to a background refresh loop; aborts it on drop.
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Stop the loop now.
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
