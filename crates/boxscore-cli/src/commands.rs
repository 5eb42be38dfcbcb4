// Subcommand logic: event sourcing, ranking and classification.
//
// Each command builds its result as data; main.rs decides how to print it.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context};
use boxscore_baseball::events::RawEvent;
use boxscore_baseball::feed::cached::CachedFeed;
use boxscore_baseball::feed::statsapi::StatsApiClient;
use boxscore_baseball::feed::{FeedQuery, PlayFeed};
use boxscore_baseball::loader;
use boxscore_baseball::stats::leaderboard::{min_at_bats, rank_leaders, trend_deltas, MetricKey};
use boxscore_baseball::stats::lines_from_events;
use boxscore_baseball::stats::metrics::PlayerLine;
use boxscore_baseball::vision::annotations::load_annotations;
use boxscore_baseball::vision::classifier::{classify_events, ClassifiedFrame};
use boxscore_core::cache::Clock;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, FeedConfig};
use crate::report::Leaderboard;

// ---------------------------------------------------------------------------
// Event sources
// ---------------------------------------------------------------------------

/// Build the cached live feed described by `config`.
pub fn build_feed(config: &FeedConfig) -> anyhow::Result<CachedFeed<StatsApiClient>> {
    let client = StatsApiClient::new(config.base_url.clone(), config.timeout())
        .context("failed to build HTTP client")?;
    Ok(CachedFeed::new(client, config.cache_ttl_millis()))
}

/// Load an event file and compute every participant's line.
pub fn lines_from_file(path: &Path) -> anyhow::Result<Vec<PlayerLine>> {
    let events = loader::load_events(path)
        .with_context(|| format!("failed to load events from {}", path.display()))?;
    Ok(lines_from_events(&events))
}

/// Fetch events through `feed` and compute every participant's line.
pub async fn lines_from_feed<F, C>(
    feed: &mut CachedFeed<F, C>,
    query: &FeedQuery,
    refresh: bool,
) -> anyhow::Result<Vec<PlayerLine>>
where
    F: PlayFeed,
    C: Clock,
{
    let events = feed
        .fetch(query, refresh)
        .await
        .with_context(|| format!("failed to fetch events for {}", query.cache_key()))?;
    if events.is_empty() {
        warn!("Feed returned no events for {}", query.cache_key());
    }
    Ok(lines_from_events(&events))
}

// ---------------------------------------------------------------------------
// Leaders
// ---------------------------------------------------------------------------

/// Effective leaderboard settings after CLI overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderSettings {
    pub metrics: Vec<MetricKey>,
    pub top_n: usize,
    pub min_at_bats: u32,
}

impl LeaderSettings {
    /// Merge CLI overrides onto the configured defaults.
    pub fn resolve(
        config: &Config,
        metrics: &[String],
        top: Option<usize>,
        min_ab: Option<u32>,
    ) -> anyhow::Result<Self> {
        let metrics = if metrics.is_empty() {
            config.leaderboard.metric_keys()?
        } else {
            metrics
                .iter()
                .map(|m| m.parse::<MetricKey>())
                .collect::<Result<Vec<_>, _>>()?
        };

        let top_n = top.unwrap_or(config.leaderboard.top_n);
        if top_n == 0 {
            bail!("--top must be greater than 0");
        }

        Ok(Self {
            metrics,
            top_n,
            min_at_bats: min_ab.unwrap_or(config.leaderboard.min_at_bats),
        })
    }
}

/// Rank `lines` for each configured metric, trending against `baseline`.
pub fn build_leaderboards(
    lines: &[PlayerLine],
    settings: &LeaderSettings,
    baseline: Option<&[PlayerLine]>,
) -> Vec<Leaderboard> {
    settings
        .metrics
        .iter()
        .map(|&metric| {
            let deltas: Option<HashMap<String, f64>> =
                baseline.map(|previous| trend_deltas(previous, lines, metric));
            let entries = rank_leaders(
                lines,
                min_at_bats(settings.min_at_bats),
                metric,
                settings.top_n,
                deltas.as_ref(),
            );
            info!(
                "Ranked {} of {} participants by {}",
                entries.len(),
                lines.len(),
                metric
            );
            Leaderboard {
                metric,
                min_at_bats: settings.min_at_bats,
                entries,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Case-insensitive lookup by participant name.
pub fn find_player<'a>(lines: &'a [PlayerLine], name: &str) -> Option<&'a PlayerLine> {
    let wanted = name.trim().to_lowercase();
    lines.iter().find(|line| line.name.to_lowercase() == wanted)
}

// ---------------------------------------------------------------------------
// Classify
// ---------------------------------------------------------------------------

/// A classified frame plus, optionally, the stat line its signals produce.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyReport {
    pub frame: ClassifiedFrame,
    pub events: Vec<RawEvent>,
    pub line: Option<PlayerLine>,
}

pub fn classify_file(
    path: &Path,
    participant: Option<&str>,
    team: Option<&str>,
) -> anyhow::Result<ClassifyReport> {
    let annotations = load_annotations(path)
        .with_context(|| format!("failed to read annotations from {}", path.display()))?;
    let frame = classify_events(&annotations.labels, &annotations.objects);
    info!(
        "Classified {}: {} signals, {} positions",
        path.display(),
        frame.signals.len(),
        frame.positions.len()
    );

    let (events, line) = match participant {
        Some(name) => {
            let events = frame.to_raw_events(name, team.unwrap_or(""));
            let line = lines_from_events(&events).into_iter().next();
            (events, line)
        }
        None => (Vec::new(), None),
    };

    Ok(ClassifyReport {
        frame,
        events,
        line,
    })
}
