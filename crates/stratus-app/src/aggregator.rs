//! The saved-city board: owns the ordered city list, its loading/error
//! state, and the periodic refresh task.
//!
//! All list mutations go through this type. Callers observe changes via
//! [`CityBoard::subscribe`] and re-read a snapshot on each notification.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use stratus_weather::{WeatherError, WeatherProvider, WeatherRecord};

use crate::settings::RefreshInterval;

#[derive(Debug, Clone, Default)]
struct BoardState {
    cities: Vec<WeatherRecord>,
    loading: bool,
    last_error: Option<String>,
}

struct RefreshTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct BoardInner {
    provider: WeatherProvider,
    state: RwLock<BoardState>,
    // serializes refresh_all against periodic ticks
    refresh_gate: tokio::sync::Mutex<()>,
    changed: watch::Sender<u64>,
    refresh_task: Mutex<Option<RefreshTask>>,
}

/// State container owning the saved-city list and its refresh lifecycle.
///
/// Cheap to clone; all clones share the same board. The periodic refresh
/// task never outlives the board: it holds only a weak reference and is
/// cancelled when the last handle drops.
#[derive(Clone)]
pub struct CityBoard {
    inner: Arc<BoardInner>,
}

impl CityBoard {
    pub fn new(provider: WeatherProvider) -> Self {
        Self::with_cities(provider, Vec::new())
    }

    /// A board pre-seeded with cities. Duplicate city names (case-sensitive)
    /// keep the first occurrence only, matching [`CityBoard::add_city`].
    pub fn with_cities(provider: WeatherProvider, cities: Vec<WeatherRecord>) -> Self {
        let mut seeded: Vec<WeatherRecord> = Vec::new();
        for record in cities {
            if !seeded.iter().any(|c| c.city_name == record.city_name) {
                seeded.push(record);
            }
        }

        let (changed, _) = watch::channel(0_u64);
        Self {
            inner: Arc::new(BoardInner {
                provider,
                state: RwLock::new(BoardState {
                    cities: seeded,
                    loading: false,
                    last_error: None,
                }),
                refresh_gate: tokio::sync::Mutex::new(()),
                changed,
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Snapshot of the saved cities in display order.
    pub fn cities(&self) -> Vec<WeatherRecord> {
        self.inner.state.read().cities.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.read().last_error.clone()
    }

    /// Change notification: the receiver's value bumps on every mutation;
    /// re-read the snapshot accessors after each change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changed.subscribe()
    }

    /// Search for a city by free-text name.
    ///
    /// On failure the result is empty and `last_error` carries a
    /// user-facing message; a successful search clears it.
    pub async fn search(&self, query: &str) -> Vec<WeatherRecord> {
        self.inner.set_loading(true);

        match self.inner.provider.search_current(query).await {
            Ok(record) => {
                self.inner.finish(None);
                vec![record]
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "city search failed");
                self.inner.finish(Some(e.user_message().to_string()));
                Vec::new()
            }
        }
    }

    /// Append a city unless one with the same name is already saved.
    /// Duplicates are a silent idempotent skip.
    pub fn add_city(&self, record: WeatherRecord) {
        {
            let mut state = self.inner.state.write();
            if state
                .cities
                .iter()
                .any(|c| c.city_name == record.city_name)
            {
                tracing::debug!(city = %record.city_name, "city already saved, skipping");
                return;
            }
            state.cities.push(record);
        }
        self.inner.notify();
    }

    /// Remove the city with the given id; no-op when absent.
    pub fn remove_city(&self, id: Uuid) {
        let removed = {
            let mut state = self.inner.state.write();
            let before = state.cities.len();
            state.cities.retain(|c| c.id != id);
            state.cities.len() != before
        };
        if removed {
            self.inner.notify();
        }
    }

    /// Move one entry from `from` to `to`, preserving everyone else's
    /// relative order. Out-of-range indices are a no-op.
    pub fn reorder(&self, from: usize, to: usize) {
        {
            let mut state = self.inner.state.write();
            if from >= state.cities.len() || to >= state.cities.len() || from == to {
                return;
            }
            let record = state.cities.remove(from);
            state.cities.insert(to, record);
        }
        self.inner.notify();
    }

    /// Detailed fetch for one saved city. Does not mutate the saved list;
    /// the merged record is returned to the caller.
    pub async fn fetch_detail(&self, id: Uuid) -> Result<WeatherRecord, WeatherError> {
        let record = self
            .inner
            .state
            .read()
            .cities
            .iter()
            .find(|c| c.id == id)
            .cloned();

        let Some(record) = record else {
            let err = WeatherError::NotFound(format!("no saved city with id {id}"));
            self.inner.finish(Some(err.user_message().to_string()));
            return Err(err);
        };

        self.inner.set_loading(true);
        match self.inner.provider.fetch_detailed(record.coordinates).await {
            Ok(detail) => {
                self.inner.finish(None);
                Ok(record.with_detail(&detail))
            }
            Err(e) => {
                tracing::warn!(city = %record.city_name, error = %e, "detail fetch failed");
                self.inner.finish(Some(e.user_message().to_string()));
                Err(e)
            }
        }
    }

    /// Refresh every saved city via the detailed endpoint, sequentially,
    /// then replace the list in the same order.
    ///
    /// All-or-nothing: the first failure aborts the batch and leaves the
    /// list exactly as it was.
    pub async fn refresh_all(&self) -> Result<(), WeatherError> {
        let _gate = self.inner.refresh_gate.lock().await;

        let snapshot = self.cities();
        if snapshot.is_empty() {
            return Ok(());
        }

        self.inner.set_loading(true);
        let mut refreshed = Vec::with_capacity(snapshot.len());
        for record in &snapshot {
            match self.inner.provider.fetch_detailed(record.coordinates).await {
                Ok(detail) => refreshed.push(record.with_detail(&detail)),
                Err(e) => {
                    tracing::warn!(city = %record.city_name, error = %e, "refresh aborted");
                    self.inner.finish(Some(e.user_message().to_string()));
                    return Err(e);
                }
            }
        }

        {
            let mut state = self.inner.state.write();
            state.cities = refreshed;
            state.loading = false;
            state.last_error = None;
        }
        self.inner.notify();
        Ok(())
    }

    /// Schedule the lighter periodic refresh: every `interval`, each saved
    /// city is re-looked-up by name and replaced in place when the search
    /// succeeds. Re-invoking cancels the previous timer first, so at most
    /// one is ever active.
    pub fn start_periodic_refresh(&self, interval: RefreshInterval) {
        self.start_periodic_with_period(Duration::from_secs(interval.as_secs().into()));
    }

    fn start_periodic_with_period(&self, period: Duration) {
        let cancel = CancellationToken::new();
        let task_token = cancel.clone();
        let weak = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; consume that tick so the first
            // refresh lands one full period from now
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(inner) = weak.upgrade() else { break };
                BoardInner::periodic_pass(&inner).await;
            }
        });

        let mut slot = self.inner.refresh_task.lock();
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
            previous.handle.abort();
        }
        *slot = Some(RefreshTask { cancel, handle });
    }

    /// Cancel the periodic refresh, if one is running.
    pub fn stop_periodic_refresh(&self) {
        let mut slot = self.inner.refresh_task.lock();
        if let Some(task) = slot.take() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }
}

impl BoardInner {
    fn notify(&self) {
        self.changed.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    fn set_loading(&self, loading: bool) {
        self.state.write().loading = loading;
        self.notify();
    }

    fn finish(&self, error: Option<String>) {
        {
            let mut state = self.state.write();
            state.loading = false;
            state.last_error = error;
        }
        self.notify();
    }

    /// One lighter refresh pass: name search per saved city, replacing each
    /// entry in place when its lookup succeeds and leaving it untouched
    /// otherwise. The record id is preserved so identity stays stable.
    async fn periodic_pass(inner: &Arc<BoardInner>) {
        let _gate = inner.refresh_gate.lock().await;

        let targets: Vec<(Uuid, String)> = inner
            .state
            .read()
            .cities
            .iter()
            .map(|c| (c.id, c.city_name.clone()))
            .collect();
        if targets.is_empty() {
            return;
        }
        tracing::debug!(cities = targets.len(), "periodic refresh tick");

        let mut updated = false;
        for (id, name) in targets {
            match inner.provider.search_current(&name).await {
                Ok(mut fresh) => {
                    fresh.id = id;
                    let mut state = inner.state.write();
                    if let Some(slot) = state.cities.iter_mut().find(|c| c.id == id) {
                        *slot = fresh;
                        updated = true;
                    }
                }
                Err(e) => {
                    tracing::debug!(city = %name, error = %e, "periodic refresh skipped entry");
                }
            }
        }

        if updated {
            inner.notify();
        }
    }
}

impl Drop for BoardInner {
    fn drop(&mut self) {
        if let Some(task) = self.refresh_task.get_mut().take() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }
}
