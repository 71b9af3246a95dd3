//! TTL cache used by the top movers aggregate
//!
//! Expiry is judged against an injectable [`Clock`] so tests can move time
//! forward without sleeping. All state sits behind a `parking_lot::RwLock`;
//! callers run on blocking threads, never across an `.await`.

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Source of "now" for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Key-value cache with per-entry time-to-live
pub trait Cache<V>: Send + Sync {
    /// Value for `key` if present and not expired
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value` under `key` for `ttl`
    fn set(&self, key: &str, value: V, ttl: std::time::Duration);

    /// Drop `key` regardless of expiry
    fn invalidate(&self, key: &str);
}

#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Process-local cache
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict so the map does not grow stale
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| now >= e.expires_at) {
            entries.remove(key);
            debug!(key, "Cache entry expired");
        }
        None
    }

    fn set(&self, key: &str, value: V, ttl: std::time::Duration) {
        let now = self.clock.now();
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.write().insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at,
            },
        );
    }

    fn invalidate(&self, key: &str) {
        self.entries.write().remove(key);
    }
}
