// Play-by-play feed: the external event source and its caching wrapper.

pub mod cached;
pub mod statsapi;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::events::RawEvent;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid feed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Date window for a feed request. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FeedQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FeedQuery {
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::between(date, date)
    }

    /// Cache key for this window, e.g. `baseball-stats-2024-06-01-2024-06-07`.
    pub fn cache_key(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "any".into());
        format!("baseball-stats-{}-{}", fmt(self.start_date), fmt(self.end_date))
    }
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Anything that can produce the raw events for a date window.
#[async_trait]
pub trait PlayFeed: Send + Sync {
    async fn fetch_events(&self, query: &FeedQuery) -> Result<Vec<RawEvent>, FeedError>;
}
