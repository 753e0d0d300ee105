//! Outcome cache
//!
//! Explicit, caller-owned memoization of strip outcomes keyed by a SHA-256
//! digest of the declared media type and the input bytes. Entries expire
//! after a fixed time-to-live; there is no global instance.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::types::StripOutcome;

/// Cache key: hex SHA-256 over `media_type || 0x00 || bytes`.
pub type CacheKey = String;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug)]
struct CacheEntry {
    outcome: StripOutcome,
    created: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    stats: CacheStats,
}

/// TTL-bounded outcome cache, safe to share across threads.
#[derive(Debug)]
pub struct StripCache {
    ttl: Duration,
    max_entries: usize,
    state: Mutex<CacheState>,
}

impl StripCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key(bytes: &[u8], media_type: &str) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(media_type.trim().to_ascii_lowercase().as_bytes());
        hasher.update([0u8]);
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    /// Returns a live entry, dropping it if its TTL has passed.
    #[instrument(skip(self))]
    pub fn get(&self, key: &str) -> Option<StripOutcome> {
        let now = Instant::now();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.entries.get(key) {
            Some(entry) if now.duration_since(entry.created) < self.ttl => {
                state.stats.hits += 1;
                return Some(entry.outcome.clone());
            }
            Some(_) => {
                state.entries.remove(key);
                state.stats.evictions += 1;
            }
            None => {}
        }
        state.stats.misses += 1;
        None
    }

    /// Stores an outcome; when full, expired entries go first, then the oldest.
    pub fn insert(&self, key: CacheKey, outcome: StripOutcome) {
        let now = Instant::now();
        let mut state = self.state.lock();
        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            let evicted = Self::purge_locked(&mut state, now, self.ttl);
            if evicted == 0 {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.created)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    state.entries.remove(&oldest);
                    state.stats.evictions += 1;
                }
            }
        }
        state.entries.insert(key, CacheEntry { outcome, created: now });
    }

    /// Removes every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.state.lock();
        let evicted = Self::purge_locked(&mut state, Instant::now(), self.ttl);
        if evicted > 0 {
            debug!(evicted, "Purged expired cache entries");
        }
        evicted
    }

    fn purge_locked(state: &mut CacheState, now: Instant, ttl: Duration) -> usize {
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| now.duration_since(entry.created) < ttl);
        let evicted = before - state.entries.len();
        state.stats.evictions += evicted as u64;
        evicted
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }
}
