// Plain-text and JSON rendering of leaderboards, stat lines and classified
// frames.

use std::fmt::Write;

use boxscore_baseball::stats::leaderboard::{LeaderboardEntry, MetricKey};
use boxscore_baseball::stats::metrics::PlayerLine;
use boxscore_baseball::vision::classifier::ClassifiedFrame;
use serde::Serialize;

pub const NO_DATA: &str = "No qualifying data";

/// One ranked metric, as rendered.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub metric: MetricKey,
    pub min_at_bats: u32,
    pub entries: Vec<LeaderboardEntry>,
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn render_leaderboard(board: &Leaderboard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} leaders (min {} AB)",
        board.metric.label(),
        board.min_at_bats
    );

    if board.entries.is_empty() {
        let _ = writeln!(out, "  {NO_DATA}");
        return out;
    }

    let name_width = board
        .entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    for entry in &board.entries {
        let _ = writeln!(
            out,
            "  {:>2}. {:<name_width$}  {:<4} {:>8} {}",
            entry.rank,
            entry.name,
            entry.team,
            entry.display,
            entry.trend.arrow(),
        );
    }
    out
}

pub fn render_leaderboards(boards: &[Leaderboard]) -> String {
    boards
        .iter()
        .map(render_leaderboard)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full stat line for one participant.
pub fn render_player(line: &PlayerLine) -> String {
    let c = &line.counts;
    let m = &line.metrics;
    let team = if line.team.is_empty() { "-" } else { &line.team };

    let mut out = String::new();
    let _ = writeln!(out, "{} ({team})", line.name);
    let _ = writeln!(
        out,
        "  PA {}  AB {}  H {}  2B {}  3B {}  HR {}  TB {}",
        c.plate_appearances, c.at_bats, c.hits, c.doubles, c.triples, c.home_runs, c.total_bases
    );
    let _ = writeln!(
        out,
        "  BB {}  HBP {}  SO {}  SAC {}  SB {}  CS {}",
        c.walks, c.hit_by_pitch, c.strikeouts, c.sacrifices, c.stolen_bases, c.caught_stealing
    );
    let _ = writeln!(
        out,
        "  AVG {}  OBP {}  SLG {}  OPS {}  ISO {}  BABIP {}",
        m.avg.display, m.obp.display, m.slg.display, m.ops.display, m.iso.display, m.babip.display
    );
    let _ = writeln!(
        out,
        "  BB% {}  K% {}  GB/FB {}  HardHit% {}",
        m.bb_rate.display, m.k_rate.display, m.gb_fb_ratio.display, m.hard_hit_rate.display
    );
    out
}

pub fn render_frame(frame: &ClassifiedFrame) -> String {
    if frame.is_empty() {
        return "No signals above the confidence threshold\n".to_string();
    }

    let mut out = String::new();
    if !frame.signals.is_empty() {
        let _ = writeln!(out, "Signals:");
        for signal in &frame.signals {
            let _ = writeln!(
                out,
                "  {:<8} {:.2}  {} ({})",
                signal.kind.outcome_code(),
                signal.score,
                signal.kind.description(),
                signal.label
            );
        }
    }
    if !frame.positions.is_empty() {
        let _ = writeln!(out, "Positions:");
        for tag in &frame.positions {
            let _ = writeln!(
                out,
                "  {:<9} {:<2}  ({:.2}, {:.2})  {:.2}",
                tag.player_label,
                tag.position.abbreviation(),
                tag.center.x,
                tag.center.y,
                tag.score
            );
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxscore_baseball::events::{OutcomeCode, RawEvent};
    use boxscore_baseball::stats::leaderboard::{min_at_bats, rank_leaders};
    use boxscore_baseball::stats::lines_from_events;
    use boxscore_baseball::vision::classifier::{classify_events, LabelDetection};

    fn sample_lines() -> Vec<PlayerLine> {
        let events = vec![
            RawEvent::new("Aaron Judge", "NYY", Some(OutcomeCode::HomeRun)),
            RawEvent::new("Aaron Judge", "NYY", Some(OutcomeCode::Single)),
            RawEvent::new("Aaron Judge", "NYY", Some(OutcomeCode::Strikeout)),
            RawEvent::new("Juan Soto", "NYY", Some(OutcomeCode::Walk)),
            RawEvent::new("Juan Soto", "NYY", Some(OutcomeCode::Double)),
        ];
        lines_from_events(&events)
    }

    #[test]
    fn leaderboard_text_lists_ranked_rows() {
        let lines = sample_lines();
        let board = Leaderboard {
            metric: MetricKey::Avg,
            min_at_bats: 0,
            entries: rank_leaders(&lines, min_at_bats(0), MetricKey::Avg, 5, None),
        };
        let text = render_leaderboard(&board);
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows[0], "AVG leaders (min 0 AB)");
        assert!(rows[1].contains("1. Juan Soto"));
        assert!(rows[1].contains("1.000"));
        assert!(rows[2].contains("2. Aaron Judge"));
        assert!(rows[2].contains(".667"));
    }

    #[test]
    fn empty_leaderboard_says_so() {
        let board = Leaderboard {
            metric: MetricKey::HomeRuns,
            min_at_bats: 50,
            entries: Vec::new(),
        };
        assert!(render_leaderboard(&board).contains(NO_DATA));
    }

    #[test]
    fn player_text_includes_rates() {
        let lines = sample_lines();
        let text = render_player(&lines[0]);
        assert!(text.starts_with("Aaron Judge (NYY)"));
        assert!(text.contains("HR 1"));
        assert!(text.contains("AVG .667"));
        assert!(text.contains("K% 33.3%"));
    }

    #[test]
    fn frame_text() {
        let frame = classify_events(
            &[LabelDetection {
                description: "Bat".into(),
                score: 0.9,
            }],
            &[],
        );
        let text = render_frame(&frame);
        assert!(text.contains("hit_signal"));
        assert!(!text.contains("Positions:"));

        let empty = classify_events(&[], &[]);
        assert!(render_frame(&empty).starts_with("No signals"));
    }

    #[test]
    fn json_output_carries_display_strings() {
        let lines = sample_lines();
        let board = Leaderboard {
            metric: MetricKey::HomeRuns,
            min_at_bats: 0,
            entries: rank_leaders(&lines, min_at_bats(0), MetricKey::HomeRuns, 3, None),
        };
        let json = to_json(&[board]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0]["metric"], "home_runs");
        assert_eq!(parsed[0]["entries"][0]["name"], "Aaron Judge");
        assert_eq!(parsed[0]["entries"][0]["display"], "1");
        assert_eq!(parsed[0]["entries"][0]["trend"], "flat");
        assert_eq!(parsed[0]["entries"][0]["line"]["metrics"]["avg"]["display"], ".667");
    }
}
