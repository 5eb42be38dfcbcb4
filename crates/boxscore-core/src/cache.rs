// Process-local key/value store with per-entry time-to-live.
//
// Entries are evicted lazily: a read that finds a stale entry deletes it and
// reports a miss. There is no background sweep and no size bound.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Default freshness window: 30 minutes.
pub const DEFAULT_TTL_MILLIS: u64 = 30 * 60 * 1000;

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Source of "now" for TTL checks, in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// cache and keep another to advance it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    pub fn advance_millis(&self, millis: u64) {
        self.now.fetch_add(millis as i64, Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A stored value plus the moment it was stored and how long it stays fresh.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: i64,
    pub ttl_millis: u64,
}

impl<T> CacheEntry<T> {
    /// An entry is live while `now - stored_at < ttl_millis`.
    pub fn is_live(&self, now: i64) -> bool {
        let age = now.saturating_sub(self.stored_at);
        age < 0 || (age as u64) < self.ttl_millis
    }
}

// ---------------------------------------------------------------------------
// ExpiringCache
// ---------------------------------------------------------------------------

/// String-keyed cache whose entries expire after their TTL.
///
/// Mutating operations (including `get`, which may evict) take `&mut self`.
/// Callers that share one cache between tasks wrap it in a lock so that a
/// read-evict-write sequence for a key happens as a unit.
#[derive(Debug)]
pub struct ExpiringCache<T, C: Clock = SystemClock> {
    entries: HashMap<String, CacheEntry<T>>,
    clock: C,
    default_ttl_millis: u64,
}

impl<T> ExpiringCache<T, SystemClock> {
    /// Create an empty cache on the wall clock with the 30-minute default TTL.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<T> Default for ExpiringCache<T, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clock> ExpiringCache<T, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
            default_ttl_millis: DEFAULT_TTL_MILLIS,
        }
    }

    /// Replace the TTL used by [`ExpiringCache::set`].
    pub fn with_default_ttl(mut self, ttl_millis: u64) -> Self {
        self.default_ttl_millis = ttl_millis;
        self
    }

    pub fn default_ttl_millis(&self) -> u64 {
        self.default_ttl_millis
    }

    /// Store `value` under `key` with the default TTL, replacing any previous entry.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        let ttl = self.default_ttl_millis;
        self.set_with_ttl(key, value, ttl);
    }

    /// Store `value` under `key` with an explicit TTL, replacing any previous entry.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: T, ttl_millis: u64) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now_millis(),
            ttl_millis,
        };
        self.entries.insert(key.into(), entry);
    }

    /// Return the value for `key` if it is present and live.
    ///
    /// A stale entry is removed and reported as `None`, so a second read of
    /// the same key is also a miss.
    pub fn get(&mut self, key: &str) -> Option<&T> {
        let now = self.clock.now_millis();
        let live = self.entries.get(key)?.is_live(now);
        if !live {
            debug!(key, "evicting stale cache entry");
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Delete `key` unconditionally. Returns the removed value, if any.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, stale ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_cache<T>() -> (ExpiringCache<T, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        (ExpiringCache::with_clock(clock.clone()), clock)
    }

    // -- Basic hit / miss --

    #[test]
    fn get_returns_fresh_value() {
        let (mut cache, _clock) = manual_cache();
        cache.set_with_ttl("k", 42, 1000);
        assert_eq!(cache.get("k"), Some(&42));
    }

    #[test]
    fn missing_key_is_a_miss() {
        let (mut cache, _clock) = manual_cache::<u32>();
        assert_eq!(cache.get("nope"), None);
    }

    // -- Expiry --

    #[test]
    fn expired_entry_is_a_miss_and_is_evicted() {
        let (mut cache, clock) = manual_cache();
        cache.set_with_ttl("k", 42, 1000);
        clock.advance_millis(1001);

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn entry_at_exact_ttl_is_stale() {
        let (mut cache, clock) = manual_cache();
        cache.set_with_ttl("k", 1, 1000);
        clock.advance_millis(999);
        assert_eq!(cache.get("k"), Some(&1));
        clock.advance_millis(1);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn stale_entries_linger_until_read() {
        let (mut cache, clock) = manual_cache();
        cache.set_with_ttl("a", 1, 10);
        cache.set_with_ttl("b", 2, 10_000);
        clock.advance_millis(50);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(&2));
    }

    #[test]
    fn default_ttl_is_thirty_minutes() {
        let (mut cache, clock) = manual_cache();
        assert_eq!(cache.default_ttl_millis(), DEFAULT_TTL_MILLIS);
        cache.set("k", "v");
        clock.advance_millis(DEFAULT_TTL_MILLIS - 1);
        assert_eq!(cache.get("k"), Some(&"v"));
        clock.advance_millis(1);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn custom_default_ttl_applies_to_set() {
        let clock = ManualClock::new(0);
        let mut cache = ExpiringCache::with_clock(clock.clone()).with_default_ttl(100);
        cache.set("k", 7);
        clock.advance_millis(100);
        assert_eq!(cache.get("k"), None);
    }

    // -- Overwrite / remove / clear --

    #[test]
    fn set_overwrites_and_restarts_ttl() {
        let (mut cache, clock) = manual_cache();
        cache.set_with_ttl("k", 1, 1000);
        clock.advance_millis(900);
        cache.set_with_ttl("k", 2, 1000);
        clock.advance_millis(900);
        assert_eq!(cache.get("k"), Some(&2));
    }

    #[test]
    fn remove_deletes_unconditionally() {
        let (mut cache, _clock) = manual_cache();
        cache.set_with_ttl("k", 5, 1000);
        assert_eq!(cache.remove("k"), Some(5));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.remove("k"), None);
    }

    #[test]
    fn clear_empties_store() {
        let (mut cache, _clock) = manual_cache();
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    // -- Clock behavior --

    #[test]
    fn clock_moving_backwards_keeps_entry_live() {
        let (mut cache, clock) = manual_cache();
        cache.set_with_ttl("k", 3, 1000);
        clock.set_millis(0);
        assert_eq!(cache.get("k"), Some(&3));
    }

    #[test]
    fn system_clock_cache_round_trip() {
        let mut cache: ExpiringCache<String> = ExpiringCache::new();
        cache.set("feed", "payload".to_string());
        assert_eq!(cache.get("feed").map(String::as_str), Some("payload"));
    }
}
