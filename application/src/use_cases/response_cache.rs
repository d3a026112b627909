//! Response cache for the single-model chat path.
//!
//! Keyed by [`Fingerprint`] of `(model, messages)`. Expiry is lazy: a stale
//! entry reads as absent and is only reclaimed when the cache fills up, at
//! which point every stale entry is swept and, if still full, the least
//! recently used entry is evicted.

use crate::config::CacheParams;
use crate::ports::clock::Clock;
use chrono::{DateTime, Utc};
use parley_domain::{Fingerprint, Message, ModelId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

struct CacheEntry {
    response: String,
    cached_at: DateTime<Utc>,
    last_access: DateTime<Utc>,
}

pub struct ResponseCache {
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(params: &CacheParams, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: params.ttl,
            max_entries: params.max_entries.max(1),
            clock,
        }
    }

    pub fn get(&self, model: &ModelId, messages: &[Message]) -> Option<String> {
        self.get_by_key(&Fingerprint::of(model, messages))
    }

    pub fn put(&self, model: &ModelId, messages: &[Message], response: impl Into<String>) {
        self.put_by_key(Fingerprint::of(model, messages), response.into());
    }

    pub fn get_by_key(&self, key: &Fingerprint) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let entry = entries.get_mut(key)?;
        if self.is_stale(entry, now) {
            return None;
        }
        entry.last_access = now;
        Some(entry.response.clone())
    }

    pub fn put_by_key(&self, key: Fingerprint, response: String) {
        let now = self.clock.now();
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            self.make_room(&mut entries, now);
        }
        entries.insert(
            key,
            CacheEntry {
                response,
                cached_at: now,
                last_access: now,
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn make_room(&self, entries: &mut HashMap<Fingerprint, CacheEntry>, now: DateTime<Utc>) {
        let before = entries.len();
        entries.retain(|_, entry| !self.is_stale(entry, now));
        debug!("Swept {} stale cache entries", before - entries.len());

        if entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                debug!("Evicting least recently used cache entry {}", key);
                entries.remove(&key);
            }
        }
    }

    fn is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        (now - entry.cached_at)
            .to_std()
            .map(|age| age > self.ttl)
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Fingerprint, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
