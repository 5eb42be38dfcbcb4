// Caching wrapper around a PlayFeed.
//
// Repeated requests for the same date window inside the freshness window are
// served from memory. Failed fetches are never cached.

use boxscore_core::cache::{Clock, ExpiringCache, SystemClock};
use tracing::{debug, info};

use crate::events::RawEvent;
use crate::feed::{FeedError, FeedQuery, PlayFeed};

/// Default freshness window for fetched play data: 5 minutes.
pub const DEFAULT_FEED_TTL_MILLIS: u64 = 5 * 60 * 1000;

/// A [`PlayFeed`] with an [`ExpiringCache`] in front of it.
///
/// `fetch` takes `&mut self`; a cached feed shared between tasks must sit
/// behind a lock so the lookup and the store for a key happen together.
pub struct CachedFeed<F, C: Clock = SystemClock> {
    inner: F,
    cache: ExpiringCache<Vec<RawEvent>, C>,
}

impl<F: PlayFeed> CachedFeed<F> {
    /// Wrap `inner` with a wall-clock cache using `ttl_millis`.
    pub fn new(inner: F, ttl_millis: u64) -> Self {
        Self::with_cache(inner, ExpiringCache::new().with_default_ttl(ttl_millis))
    }
}

impl<F: PlayFeed, C: Clock> CachedFeed<F, C> {
    pub fn with_cache(inner: F, cache: ExpiringCache<Vec<RawEvent>, C>) -> Self {
        Self { inner, cache }
    }

    /// Events for `query`, from cache when fresh unless `bypass_cache` is set.
    pub async fn fetch(
        &mut self,
        query: &FeedQuery,
        bypass_cache: bool,
    ) -> Result<Vec<RawEvent>, FeedError> {
        let key = query.cache_key();

        if !bypass_cache {
            if let Some(events) = self.cache.get(&key) {
                debug!(key = %key, count = events.len(), "feed cache hit");
                return Ok(events.clone());
            }
        }

        let events = self.inner.fetch_events(query).await?;
        info!("Caching {} events under {}", events.len(), key);
        self.cache.set(key, events.clone());
        Ok(events)
    }

    /// Drop any cached result for `query`.
    pub fn invalidate(&mut self, query: &FeedQuery) {
        self.cache.remove(&query.cache_key());
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::OutcomeCode;
    use async_trait::async_trait;
    use boxscore_core::cache::ManualClock;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts calls and can be told to fail.
    #[derive(Default)]
    struct CountingFeed {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl PlayFeed for CountingFeed {
        async fn fetch_events(&self, query: &FeedQuery) -> Result<Vec<RawEvent>, FeedError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(FeedError::Status {
                    url: query.cache_key(),
                    status: 503,
                });
            }
            Ok(vec![RawEvent::new(
                format!("Batter {n}"),
                "NYY",
                Some(OutcomeCode::Single),
            )])
        }
    }

    fn cached(clock: &ManualClock) -> CachedFeed<CountingFeed, ManualClock> {
        let cache = ExpiringCache::with_clock(clock.clone()).with_default_ttl(DEFAULT_FEED_TTL_MILLIS);
        CachedFeed::with_cache(CountingFeed::default(), cache)
    }

    fn june(day: u32) -> FeedQuery {
        FeedQuery::on(chrono::NaiveDate::from_ymd_opt(2024, 6, day).unwrap())
    }

    #[tokio::test]
    async fn second_fetch_served_from_cache() {
        let clock = ManualClock::new(0);
        let mut feed = cached(&clock);

        let first = feed.fetch(&june(1), false).await.unwrap();
        let second = feed.fetch(&june(1), false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(feed.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_windows_fetch_separately() {
        let clock = ManualClock::new(0);
        let mut feed = cached(&clock);

        feed.fetch(&june(1), false).await.unwrap();
        feed.fetch(&june(2), false).await.unwrap();

        assert_eq!(feed.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let clock = ManualClock::new(0);
        let mut feed = cached(&clock);

        feed.fetch(&june(1), false).await.unwrap();
        clock.advance_millis(DEFAULT_FEED_TTL_MILLIS + 1);
        let refreshed = feed.fetch(&june(1), false).await.unwrap();

        assert_eq!(feed.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed[0].participant_name, "Batter 1");
    }

    #[tokio::test]
    async fn bypass_skips_cache_but_refreshes_it() {
        let clock = ManualClock::new(0);
        let mut feed = cached(&clock);

        feed.fetch(&june(1), false).await.unwrap();
        let bypassed = feed.fetch(&june(1), true).await.unwrap();
        let cached_again = feed.fetch(&june(1), false).await.unwrap();

        assert_eq!(feed.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(bypassed, cached_again);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let clock = ManualClock::new(0);
        let mut feed = cached(&clock);

        feed.inner().fail.store(true, Ordering::SeqCst);
        assert!(feed.fetch(&june(1), false).await.is_err());

        feed.inner().fail.store(false, Ordering::SeqCst);
        let events = feed.fetch(&june(1), false).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(feed.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let clock = ManualClock::new(0);
        let mut feed = cached(&clock);

        feed.fetch(&june(1), false).await.unwrap();
        feed.invalidate(&june(1));
        feed.fetch(&june(1), false).await.unwrap();

        assert_eq!(feed.inner().calls.load(Ordering::SeqCst), 2);
    }
}
