// Rate statistics derived from counting stats.
//
// Every stat is defined for every participant: a zero denominator yields a
// fixed fallback rather than NaN. Display strings are part of the contract
// (three places for averages, one for percentages, two for ratios).

use serde::Serialize;

use crate::stats::reducer::{ParticipantAccumulator, ReducedEvents};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A rate stat: the numeric value used for sorting and its display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateStat {
    pub value: f64,
    pub display: String,
}

impl RateStat {
    fn fallback(display: &str) -> Self {
        Self {
            value: 0.0,
            display: display.to_string(),
        }
    }

    /// Batting-average style: `.667`, `1.000`.
    fn average(value: f64) -> Self {
        Self {
            value,
            display: format_average(value),
        }
    }

    /// Percentage of a fraction, one decimal: `12.5%`.
    fn percent(fraction: f64) -> Self {
        let value = fraction * 100.0;
        Self {
            value,
            display: format!("{:.1}%", round_half_up(value, 1)),
        }
    }

    /// Plain ratio, two decimals: `1.50`.
    fn ratio(value: f64) -> Self {
        Self {
            value,
            display: format!("{:.2}", round_half_up(value, 2)),
        }
    }
}

/// All derived rate stats for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedMetrics {
    pub avg: RateStat,
    pub obp: RateStat,
    pub slg: RateStat,
    pub ops: RateStat,
    pub iso: RateStat,
    pub babip: RateStat,
    pub bb_rate: RateStat,
    pub k_rate: RateStat,
    pub gb_fb_ratio: RateStat,
    pub hard_hit_rate: RateStat,
}

/// A participant's identity, counting stats and derived stats together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLine {
    pub name: String,
    pub team: String,
    pub counts: ParticipantAccumulator,
    pub metrics: ComputedMetrics,
}

impl PlayerLine {
    pub fn from_accumulator(acc: &ParticipantAccumulator) -> Self {
        Self {
            name: acc.name.clone(),
            team: acc.team.clone(),
            counts: acc.clone(),
            metrics: compute_metrics(acc),
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Round to `places` decimals with ties going up (`.3125` -> `.313`).
/// `format!` on its own rounds exact ties to even.
fn round_half_up(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Three decimals with the leading zero dropped below 1.0 (`.300`, `1.066`).
pub fn format_average(value: f64) -> String {
    let text = format!("{:.3}", round_half_up(value, 3));
    match text.strip_prefix("0.") {
        Some(rest) => format!(".{rest}"),
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute every rate stat for one accumulator.
pub fn compute_metrics(acc: &ParticipantAccumulator) -> ComputedMetrics {
    let ab = acc.at_bats as f64;
    let pa = acc.plate_appearances as f64;

    let avg = if acc.at_bats == 0 {
        RateStat::fallback(".000")
    } else {
        RateStat::average(acc.hits as f64 / ab)
    };

    let obp_denom = acc.at_bats + acc.walks + acc.hit_by_pitch + acc.sacrifices;
    let obp = if obp_denom == 0 {
        RateStat::fallback(".000")
    } else {
        let on_base = acc.hits + acc.walks + acc.hit_by_pitch;
        RateStat::average(on_base as f64 / obp_denom as f64)
    };

    let slg = if acc.at_bats == 0 {
        RateStat::fallback(".000")
    } else {
        RateStat::average(acc.total_bases as f64 / ab)
    };

    let ops = RateStat::average(obp.value + slg.value);

    let iso = if acc.at_bats == 0 {
        RateStat::fallback("0")
    } else {
        let extra_bases = acc.total_bases.saturating_sub(acc.hits);
        RateStat::average(extra_bases as f64 / ab)
    };

    let babip_denom = acc.at_bats as i64 - acc.strikeouts as i64 - acc.home_runs as i64
        + acc.sacrifices as i64;
    let babip = if babip_denom <= 0 {
        RateStat::fallback(".000")
    } else {
        let balls_in_play_hits = acc.hits.saturating_sub(acc.home_runs);
        RateStat::average(balls_in_play_hits as f64 / babip_denom as f64)
    };

    let (bb_rate, k_rate) = if acc.plate_appearances == 0 {
        (RateStat::fallback("0.0%"), RateStat::fallback("0.0%"))
    } else {
        (
            RateStat::percent(acc.walks as f64 / pa),
            RateStat::percent(acc.strikeouts as f64 / pa),
        )
    };

    let gb_fb_ratio = if acc.fly_outs == 0 {
        RateStat::fallback("0.00")
    } else {
        RateStat::ratio(acc.ground_outs as f64 / acc.fly_outs as f64)
    };

    let hard_hit_rate = if acc.at_bats == 0 {
        RateStat::fallback("0.0%")
    } else {
        RateStat::percent(acc.hard_hit_balls as f64 / ab)
    };

    ComputedMetrics {
        avg,
        obp,
        slg,
        ops,
        iso,
        babip,
        bb_rate,
        k_rate,
        gb_fb_ratio,
        hard_hit_rate,
    }
}

/// Build a [`PlayerLine`] for every reduced participant, in first-seen order.
pub fn compute_lines(reduced: &ReducedEvents) -> Vec<PlayerLine> {
    reduced.iter().map(PlayerLine::from_accumulator).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
