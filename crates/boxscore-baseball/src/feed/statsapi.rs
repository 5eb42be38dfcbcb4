// MLB Stats API client: schedule lookup plus per-game live feeds.
//
// Every completed or in-progress play in `liveData.plays.allPlays` becomes
// one RawEvent credited to the batter. Fields the API leaves out are
// tolerated; a play without a result simply has no outcome.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::events::{OutcomeCode, RawEvent};
use crate::feed::{FeedError, FeedQuery, PlayFeed};

pub const DEFAULT_BASE_URL: &str = "https://statsapi.mlb.com/api";

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct Schedule {
    #[serde(default)]
    dates: Vec<ScheduleDate>,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleDate {
    #[serde(default)]
    games: Vec<ScheduleGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleGame {
    game_pk: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveFeed {
    #[serde(default)]
    game_data: GameData,
    #[serde(default)]
    live_data: LiveData,
}

#[derive(Debug, Default, Deserialize)]
struct GameData {
    #[serde(default)]
    teams: GameTeams,
}

#[derive(Debug, Default, Deserialize)]
struct GameTeams {
    #[serde(default)]
    home: TeamInfo,
    #[serde(default)]
    away: TeamInfo,
}

#[derive(Debug, Default, Deserialize)]
struct TeamInfo {
    #[serde(default)]
    name: String,
    #[serde(default)]
    abbreviation: Option<String>,
}

impl TeamInfo {
    fn label(&self) -> &str {
        self.abbreviation.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
struct LiveData {
    #[serde(default)]
    plays: Plays,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Plays {
    #[serde(default)]
    all_plays: Vec<Play>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Play {
    #[serde(default)]
    result: PlayResult,
    #[serde(default)]
    about: About,
    #[serde(default)]
    matchup: Matchup,
    #[serde(default)]
    play_events: Vec<PlayEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayResult {
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    event: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct About {
    #[serde(default)]
    at_bat_index: Option<u64>,
    #[serde(default)]
    half_inning: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Matchup {
    #[serde(default)]
    batter: Option<Person>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    #[serde(default)]
    full_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayEvent {
    #[serde(default)]
    hit_data: Option<HitData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HitData {
    #[serde(default)]
    launch_speed: Option<f64>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn events_from_feed(feed: &LiveFeed) -> Vec<RawEvent> {
    let teams = &feed.game_data.teams;

    feed.live_data
        .plays
        .all_plays
        .iter()
        .map(|play| {
            let batting_team = match play.about.half_inning.as_deref() {
                Some("top") => teams.away.label(),
                Some("bottom") => teams.home.label(),
                _ => "",
            };

            let outcome = play
                .result
                .event_type
                .as_deref()
                .and_then(OutcomeCode::parse_optional)
                .or_else(|| play.result.event.as_deref().and_then(OutcomeCode::parse_optional));

            // Last batted-ball reading in the plate appearance.
            let exit_velocity = play
                .play_events
                .iter()
                .rev()
                .find_map(|e| e.hit_data.as_ref().and_then(|h| h.launch_speed));

            RawEvent {
                participant_name: play
                    .matchup
                    .batter
                    .as_ref()
                    .map(|p| p.full_name.trim().to_string())
                    .unwrap_or_default(),
                team_label: batting_team.to_string(),
                outcome,
                exit_velocity,
                sequence_index: play.about.at_bat_index,
            }
        })
        .collect()
}

/// Convert one game's live-feed JSON into raw events.
pub fn parse_live_feed(json: &str) -> Result<Vec<RawEvent>, FeedError> {
    let feed: LiveFeed = serde_json::from_str(json)?;
    Ok(events_from_feed(&feed))
}

/// Extract the game identifiers from a schedule response.
pub fn parse_schedule(json: &str) -> Result<Vec<u64>, FeedError> {
    let schedule: Schedule = serde_json::from_str(json)?;
    Ok(game_pks(&schedule))
}

fn game_pks(schedule: &Schedule) -> Vec<u64> {
    schedule
        .dates
        .iter()
        .flat_map(|d| d.games.iter().map(|g| g.game_pk))
        .collect()
}

// ---------------------------------------------------------------------------
// StatsApiClient
// ---------------------------------------------------------------------------

/// HTTP client for the public MLB Stats API.
pub struct StatsApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatsApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn schedule_url(&self, query: &FeedQuery) -> String {
        let mut url = format!("{}/v1/schedule?sportId=1&gameType=R", self.base_url);
        if let Some(start) = query.start_date {
            url.push_str(&format!("&startDate={start}"));
        }
        if let Some(end) = query.end_date {
            url.push_str(&format!("&endDate={end}"));
        }
        url
    }

    pub fn live_feed_url(&self, game_pk: u64) -> String {
        format!("{}/v1.1/game/{game_pk}/feed/live", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        debug!(url, "GET");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PlayFeed for StatsApiClient {
    async fn fetch_events(&self, query: &FeedQuery) -> Result<Vec<RawEvent>, FeedError> {
        let schedule: Schedule = self.get_json(&self.schedule_url(query)).await?;
        let games = game_pks(&schedule);

        let mut events = Vec::new();
        for game_pk in &games {
            let feed: LiveFeed = self.get_json(&self.live_feed_url(*game_pk)).await?;
            events.extend(events_from_feed(&feed));
        }

        info!(
            "Fetched {} play events from {} games ({})",
            events.len(),
            games.len(),
            query.cache_key()
        );
        Ok(events)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
