// Leaderboard ranking: qualify, filter, stable sort, truncate, rank.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::stats::metrics::PlayerLine;

// ---------------------------------------------------------------------------
// Metric keys
// ---------------------------------------------------------------------------

/// A statistic a leaderboard can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Avg,
    Obp,
    Slg,
    Ops,
    Iso,
    Babip,
    BbRate,
    KRate,
    GbFbRatio,
    HardHitRate,
    Hits,
    HomeRuns,
    Doubles,
    Triples,
    Walks,
    Strikeouts,
    StolenBases,
    TotalBases,
}

impl MetricKey {
    pub const ALL: [MetricKey; 18] = [
        MetricKey::Avg,
        MetricKey::Obp,
        MetricKey::Slg,
        MetricKey::Ops,
        MetricKey::Iso,
        MetricKey::Babip,
        MetricKey::BbRate,
        MetricKey::KRate,
        MetricKey::GbFbRatio,
        MetricKey::HardHitRate,
        MetricKey::Hits,
        MetricKey::HomeRuns,
        MetricKey::Doubles,
        MetricKey::Triples,
        MetricKey::Walks,
        MetricKey::Strikeouts,
        MetricKey::StolenBases,
        MetricKey::TotalBases,
    ];

    /// Short column label, e.g. `"HR"`.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::Avg => "AVG",
            MetricKey::Obp => "OBP",
            MetricKey::Slg => "SLG",
            MetricKey::Ops => "OPS",
            MetricKey::Iso => "ISO",
            MetricKey::Babip => "BABIP",
            MetricKey::BbRate => "BB%",
            MetricKey::KRate => "K%",
            MetricKey::GbFbRatio => "GB/FB",
            MetricKey::HardHitRate => "HardHit%",
            MetricKey::Hits => "H",
            MetricKey::HomeRuns => "HR",
            MetricKey::Doubles => "2B",
            MetricKey::Triples => "3B",
            MetricKey::Walks => "BB",
            MetricKey::Strikeouts => "SO",
            MetricKey::StolenBases => "SB",
            MetricKey::TotalBases => "TB",
        }
    }

    /// Numeric value used for ranking.
    pub fn value(&self, line: &PlayerLine) -> f64 {
        let m = &line.metrics;
        let c = &line.counts;
        match self {
            MetricKey::Avg => m.avg.value,
            MetricKey::Obp => m.obp.value,
            MetricKey::Slg => m.slg.value,
            MetricKey::Ops => m.ops.value,
            MetricKey::Iso => m.iso.value,
            MetricKey::Babip => m.babip.value,
            MetricKey::BbRate => m.bb_rate.value,
            MetricKey::KRate => m.k_rate.value,
            MetricKey::GbFbRatio => m.gb_fb_ratio.value,
            MetricKey::HardHitRate => m.hard_hit_rate.value,
            MetricKey::Hits => c.hits as f64,
            MetricKey::HomeRuns => c.home_runs as f64,
            MetricKey::Doubles => c.doubles as f64,
            MetricKey::Triples => c.triples as f64,
            MetricKey::Walks => c.walks as f64,
            MetricKey::Strikeouts => c.strikeouts as f64,
            MetricKey::StolenBases => c.stolen_bases as f64,
            MetricKey::TotalBases => c.total_bases as f64,
        }
    }

    /// Display form: the rate stat's formatted string, or the raw count.
    pub fn display(&self, line: &PlayerLine) -> String {
        let m = &line.metrics;
        match self {
            MetricKey::Avg => m.avg.display.clone(),
            MetricKey::Obp => m.obp.display.clone(),
            MetricKey::Slg => m.slg.display.clone(),
            MetricKey::Ops => m.ops.display.clone(),
            MetricKey::Iso => m.iso.display.clone(),
            MetricKey::Babip => m.babip.display.clone(),
            MetricKey::BbRate => m.bb_rate.display.clone(),
            MetricKey::KRate => m.k_rate.display.clone(),
            MetricKey::GbFbRatio => m.gb_fb_ratio.display.clone(),
            MetricKey::HardHitRate => m.hard_hit_rate.display.clone(),
            _ => format!("{}", self.value(line) as u64),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric `{0}`")]
pub struct MetricKeyError(pub String);

impl FromStr for MetricKey {
    type Err = MetricKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let metric = match key.as_str() {
            "avg" | "ba" | "batting_average" => MetricKey::Avg,
            "obp" => MetricKey::Obp,
            "slg" => MetricKey::Slg,
            "ops" => MetricKey::Ops,
            "iso" => MetricKey::Iso,
            "babip" => MetricKey::Babip,
            "bb_rate" | "bb%" => MetricKey::BbRate,
            "k_rate" | "k%" => MetricKey::KRate,
            "gb_fb_ratio" | "gb/fb" => MetricKey::GbFbRatio,
            "hard_hit_rate" | "hardhit%" => MetricKey::HardHitRate,
            "hits" | "h" => MetricKey::Hits,
            "home_runs" | "hr" => MetricKey::HomeRuns,
            "doubles" | "2b" => MetricKey::Doubles,
            "triples" | "3b" => MetricKey::Triples,
            "walks" | "bb" => MetricKey::Walks,
            "strikeouts" | "so" | "k" => MetricKey::Strikeouts,
            "stolen_bases" | "sb" => MetricKey::StolenBases,
            "total_bases" | "tb" => MetricKey::TotalBases,
            _ => return Err(MetricKeyError(s.to_string())),
        };
        Ok(metric)
    }
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction of change since a previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_delta(delta: Option<f64>) -> Self {
        match delta {
            Some(d) if d > 0.0 => Trend::Up,
            Some(d) if d < 0.0 => Trend::Down,
            _ => Trend::Flat,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "-",
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub team: String,
    pub metric: MetricKey,
    pub value: f64,
    pub display: String,
    pub qualifies: bool,
    pub trend: Trend,
    pub line: PlayerLine,
}

/// Qualification predicate: at least `min` at-bats.
pub fn min_at_bats(min: u32) -> impl Fn(&PlayerLine) -> bool {
    move |line| line.counts.at_bats >= min
}

/// Rank `lines` by `metric`.
///
/// Steps:
/// 1. Drop lines failing `qualify`.
/// 2. Drop lines whose metric is not strictly positive.
/// 3. Stable sort descending, so ties keep their input order.
/// 4. Keep the top `top_n`.
/// 5. Number ranks 1..=N.
/// 6. Attach a trend from `trends` (keyed by name); absent means flat.
///
/// An empty result is a normal outcome ("no qualified leaders").
pub fn rank_leaders<F>(
    lines: &[PlayerLine],
    qualify: F,
    metric: MetricKey,
    top_n: usize,
    trends: Option<&HashMap<String, f64>>,
) -> Vec<LeaderboardEntry>
where
    F: Fn(&PlayerLine) -> bool,
{
    let mut candidates: Vec<(&PlayerLine, f64)> = lines
        .iter()
        .filter(|line| qualify(line))
        .map(|line| (line, metric.value(line)))
        .filter(|(_, value)| *value > 0.0)
        .collect();

    // `sort_by` is stable.
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(top_n);

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, (line, value))| {
            let delta = trends.and_then(|t| t.get(&line.name).copied());
            LeaderboardEntry {
                rank: i + 1,
                name: line.name.clone(),
                team: line.team.clone(),
                metric,
                value,
                display: metric.display(line),
                qualifies: true,
                trend: Trend::from_delta(delta),
                line: line.clone(),
            }
        })
        .collect()
}

/// Per-participant change in `metric` between two snapshots
/// (`current - previous`). Participants missing from `previous` get no entry.
pub fn trend_deltas(
    previous: &[PlayerLine],
    current: &[PlayerLine],
    metric: MetricKey,
) -> HashMap<String, f64> {
    let before: HashMap<&str, f64> = previous
        .iter()
        .map(|line| (line.name.as_str(), metric.value(line)))
        .collect();

    current
        .iter()
        .filter_map(|line| {
            before
                .get(line.name.as_str())
                .map(|prev| (line.name.clone(), metric.value(line) - prev))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
