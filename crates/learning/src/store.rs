//! Keyed registry of per-player predictors with idle expiry.
//!
//! The store hands out [`PredictorHandle`]s: cheap clones sharing one
//! predictor. Every lookup through [`SubjectStore::get_or_create`] refreshes
//! the player's last-access time. An entry untouched for longer than the
//! configured idle timeout is dropped the next time it is looked up. Lookups
//! also sweep every other idle entry, at most once per timeout period, so
//! players who never return are reclaimed without help from the host.
//! [`SubjectStore::evict_idle`] forces a sweep. A player whose entry was
//! dropped starts over with an empty predictor.
//!
//! The map itself is safe to share across threads. Pushes into a single
//! predictor are serialized by its mutex, but interleaving order between two
//! writers for the same player is left to the caller.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::config::LearningConfig;
use crate::event::{ActionKind, Event};
use crate::predictor::Predictor;

/// Shared handle to one player's predictor.
#[derive(Clone, Debug, Default)]
pub struct PredictorHandle {
    inner: Arc<Mutex<Predictor>>,
}

impl PredictorHandle {
    fn new(predictor: Predictor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(predictor)),
        }
    }

    // Every predictor mutation is a single push or swap, so a poisoned lock
    // still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, Predictor> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, event: Event) {
        self.lock().push(event);
    }

    pub fn push_kind(&self, kind: ActionKind) {
        self.lock().push_kind(kind);
    }

    pub fn end_sequence(&self) {
        self.lock().end_sequence();
    }

    pub fn expected_next_event(&self) -> Option<Event> {
        self.lock().expected_next_event()
    }

    pub fn expected_counter(&self) -> Option<ActionKind> {
        self.lock().expected_counter()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history_len()
    }

    /// Runs `f` against the predictor while holding its lock.
    pub fn with<R>(&self, f: impl FnOnce(&Predictor) -> R) -> R {
        f(&self.lock())
    }

    /// Whether both handles refer to the same predictor.
    pub fn ptr_eq(&self, other: &PredictorHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[derive(Debug)]
struct Entry {
    handle: PredictorHandle,
    last_access: Instant,
}

impl Entry {
    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_access) >= timeout
    }
}

#[derive(Debug)]
struct Registry<K> {
    map: HashMap<K, Entry>,
    last_sweep: Instant,
}

impl<K> Registry<K>
where
    K: Eq + Hash,
{
    fn sweep(&mut self, now: Instant, timeout: Duration) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_idle(now, timeout));
        self.last_sweep = now;

        let removed = before - self.map.len();
        if removed > 0 {
            tracing::debug!(
                "evicted {} idle predictors ({} remaining)",
                removed,
                self.map.len()
            );
        }
        removed
    }

    fn sweep_due(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_sweep) >= timeout
    }
}

/// Registry mapping a player id to exactly one predictor.
#[derive(Debug)]
pub struct SubjectStore<K> {
    entries: RwLock<Registry<K>>,
    config: LearningConfig,
}

impl<K> SubjectStore<K>
where
    K: Eq + Hash + Clone,
{
    /// Store with the default 30 minute idle timeout.
    pub fn new() -> Self {
        Self::with_config(LearningConfig::default())
    }

    pub fn with_config(config: LearningConfig) -> Self {
        Self {
            entries: RwLock::new(Registry {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn idle_timeout(&self) -> Duration {
        self.config.idle_timeout
    }

    /// Returns the predictor for `id`, creating an empty one if absent or
    /// expired, and refreshes its idle timer.
    pub fn get_or_create(&self, id: &K) -> PredictorHandle {
        self.get_or_create_at(id, Instant::now())
    }

    fn get_or_create_at(&self, id: &K, now: Instant) -> PredictorHandle {
        let timeout = self.config.idle_timeout;
        let mut registry = self.write();

        if registry.sweep_due(now, timeout) {
            registry.sweep(now, timeout);
        } else if registry
            .map
            .get(id)
            .is_some_and(|entry| entry.is_idle(now, timeout))
        {
            registry.map.remove(id);
            tracing::debug!("evicted idle predictor on access");
        }

        let subjects = registry.map.len();
        let entry = registry.map.entry(id.clone()).or_insert_with(|| {
            tracing::debug!("created predictor (subjects: {})", subjects + 1);
            Entry {
                handle: PredictorHandle::new(Predictor::with_vote_key(self.config.vote_key)),
                last_access: now,
            }
        });
        entry.last_access = now;
        entry.handle.clone()
    }

    /// Drops every entry idle past the timeout. Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        self.write().sweep(now, self.config.idle_timeout)
    }

    /// Whether a live predictor exists for `id`. Does not refresh its timer.
    pub fn contains(&self, id: &K) -> bool {
        self.contains_at(id, Instant::now())
    }

    fn contains_at(&self, id: &K, now: Instant) -> bool {
        self.read()
            .map
            .get(id)
            .is_some_and(|entry| !entry.is_idle(now, self.config.idle_timeout))
    }

    /// Drops the predictor for `id`, returning its handle if one existed.
    pub fn remove(&self, id: &K) -> Option<PredictorHandle> {
        self.write().map.remove(id).map(|entry| entry.handle)
    }

    /// Number of stored entries, including idle ones not yet swept.
    pub fn len(&self) -> usize {
        self.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().map.is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Registry<K>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Registry<K>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K> Default for SubjectStore<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
