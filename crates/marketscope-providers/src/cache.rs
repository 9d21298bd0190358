//! Time-bounded cache for SEO metrics, keyed by root domain.
//!
//! Freshness is measured against an injected [`Clock`] returning monotonic
//! [`Instant`]s so expiry can be driven deterministically in tests. The map
//! sits behind a `std::sync::Mutex`; every operation is a short
//! read-check-write with no `.await` while the lock is held.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::types::SeoMetrics;

/// Source of monotonic time for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub metrics: SeoMetrics,
    pub stored_at: Instant,
}

pub struct SeoCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl std::fmt::Debug for SeoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeoCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl SeoCache {
    /// Cache backed by the system monotonic clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns fresh metrics for `domain`, evicting the entry if it expired.
    pub fn get(&self, domain: &str) -> Option<SeoMetrics> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let expired = self.is_expired(entries.get(domain)?, now);
        if expired {
            entries.remove(domain);
            return None;
        }
        entries.get(domain).map(|entry| entry.metrics.clone())
    }

    /// Stores `metrics` under its own domain, replacing any previous entry.
    /// Expired entries for other domains are dropped at the same time.
    pub fn put(&self, metrics: SeoMetrics) {
        let now = self.clock.now();
        let mut entries = self.lock();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        entries.insert(
            metrics.domain.clone(),
            CacheEntry {
                metrics,
                stored_at: now,
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) >= self.ttl
    }

    /// Number of stored entries, including ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panicking writer cannot leave an entry half-written, so the map
        // is still usable after poisoning.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
