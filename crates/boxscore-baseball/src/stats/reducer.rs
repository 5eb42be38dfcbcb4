// Folds raw play events into per-participant counting stats.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::events::{OutcomeCode, RawEvent};

/// Exit velocity (mph) at or above which a batted ball counts as hard hit.
pub const HARD_HIT_MPH: f64 = 95.0;

// ---------------------------------------------------------------------------
// ParticipantAccumulator
// ---------------------------------------------------------------------------

/// Running counting stats for one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantAccumulator {
    pub name: String,
    pub team: String,
    pub at_bats: u32,
    pub hits: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub plate_appearances: u32,
    pub strikeouts: u32,
    pub walks: u32,
    pub hit_by_pitch: u32,
    pub sacrifices: u32,
    pub total_bases: u32,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
    pub ground_outs: u32,
    pub fly_outs: u32,
    pub hard_hit_balls: u32,
    pub pitches_seen: u32,
}

impl ParticipantAccumulator {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            ..Default::default()
        }
    }

    /// Apply one event. Counters only ever go up.
    fn record(&mut self, event: &RawEvent) {
        if self.team.is_empty() && !event.team_label.trim().is_empty() {
            self.team = event.team_label.trim().to_string();
        }

        if event.exit_velocity.is_some_and(|mph| mph >= HARD_HIT_MPH) {
            self.hard_hit_balls += 1;
        }

        let Some(outcome) = &event.outcome else {
            return;
        };

        // Every observed outcome is one pitch seen and one plate appearance.
        self.plate_appearances += 1;
        self.pitches_seen += 1;

        match outcome {
            OutcomeCode::Single => self.record_hit(1),
            OutcomeCode::Double => self.record_hit(2),
            OutcomeCode::Triple => self.record_hit(3),
            OutcomeCode::HomeRun => self.record_hit(4),
            OutcomeCode::Strikeout => {
                self.strikeouts += 1;
                self.at_bats += 1;
            }
            OutcomeCode::Walk => self.walks += 1,
            OutcomeCode::HitByPitch => self.hit_by_pitch += 1,
            OutcomeCode::SacFly | OutcomeCode::SacBunt => self.sacrifices += 1,
            OutcomeCode::FieldOut | OutcomeCode::ForceOut | OutcomeCode::GroundedIntoDoublePlay => {
                self.at_bats += 1;
                if outcome.indicates_ground_ball() {
                    self.ground_outs += 1;
                } else {
                    self.fly_outs += 1;
                }
            }
            OutcomeCode::StolenBase => self.stolen_bases += 1,
            OutcomeCode::CaughtStealing => self.caught_stealing += 1,
            OutcomeCode::Other(_) => {}
        }
    }

    fn record_hit(&mut self, bases: u32) {
        self.hits += 1;
        self.at_bats += 1;
        self.total_bases += bases;
        match bases {
            1 => self.singles += 1,
            2 => self.doubles += 1,
            3 => self.triples += 1,
            _ => self.home_runs += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// ReducedEvents
// ---------------------------------------------------------------------------

/// Immutable result of a reduction: accumulators keyed by participant name,
/// iterated in the order participants were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedEvents {
    accumulators: Vec<ParticipantAccumulator>,
    index: HashMap<String, usize>,
}

impl ReducedEvents {
    pub fn get(&self, name: &str) -> Option<&ParticipantAccumulator> {
        self.index.get(name).map(|&i| &self.accumulators[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantAccumulator> {
        self.accumulators.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accumulators.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReducedEvents {
    type Item = &'a ParticipantAccumulator;
    type IntoIter = std::slice::Iter<'a, ParticipantAccumulator>;

    fn into_iter(self) -> Self::IntoIter {
        self.accumulators.iter()
    }
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// Fold a full event history into one accumulator per participant.
///
/// Events without a participant name are skipped. The fold has no hidden
/// state, so re-running it over a grown history is safe.
pub fn reduce_events<'a, I>(events: I) -> ReducedEvents
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut reduced = ReducedEvents::default();
    let mut skipped = 0usize;

    for event in events {
        if !event.is_attributable() {
            skipped += 1;
            continue;
        }
        let name = event.participant_name.trim();
        let slot = match reduced.index.get(name) {
            Some(&i) => i,
            None => {
                let i = reduced.accumulators.len();
                reduced
                    .accumulators
                    .push(ParticipantAccumulator::new(name, event.team_label.trim()));
                reduced.index.insert(name.to_string(), i);
                i
            }
        };
        reduced.accumulators[slot].record(event);
    }

    if skipped > 0 {
        debug!(skipped, "skipped events without a participant");
    }

    reduced
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(name: &str, code: &str) -> RawEvent {
        RawEvent::new(name, "NYY", OutcomeCode::parse_optional(code))
    }

    fn all_codes() -> Vec<&'static str> {
        vec![
            "single",
            "double",
            "triple",
            "home_run",
            "strikeout",
            "walk",
            "hit_by_pitch",
            "sac_fly",
            "sac_bunt",
            "field_out",
            "force_out",
            "grounded_into_double_play",
            "stolen_base",
            "caught_stealing",
            "wild_pitch",
        ]
    }

    // -- Outcome mapping --

    #[test]
    fn concrete_scenario_counts() {
        let events = vec![
            ev("A", "single"),
            ev("A", "double"),
            ev("A", "walk"),
            ev("A", "strikeout"),
        ];
        let reduced = reduce_events(&events);
        let a = reduced.get("A").unwrap();

        assert_eq!(a.at_bats, 3);
        assert_eq!(a.hits, 2);
        assert_eq!(a.singles, 1);
        assert_eq!(a.doubles, 1);
        assert_eq!(a.total_bases, 3);
        assert_eq!(a.walks, 1);
        assert_eq!(a.strikeouts, 1);
        assert_eq!(a.plate_appearances, 4);
        assert_eq!(a.pitches_seen, 4);
    }

    #[test]
    fn hit_types_add_bases() {
        let events = vec![
            ev("A", "single"),
            ev("A", "double"),
            ev("A", "triple"),
            ev("A", "home_run"),
        ];
        let a = reduce_events(&events).get("A").cloned().unwrap();
        assert_eq!(a.hits, 4);
        assert_eq!(a.at_bats, 4);
        assert_eq!(a.total_bases, 10);
        assert_eq!((a.singles, a.doubles, a.triples, a.home_runs), (1, 1, 1, 1));
    }

    #[test]
    fn non_at_bat_outcomes() {
        let events = vec![
            ev("A", "walk"),
            ev("A", "hit_by_pitch"),
            ev("A", "sac_fly"),
            ev("A", "sac_bunt"),
            ev("A", "stolen_base"),
            ev("A", "caught_stealing"),
        ];
        let a = reduce_events(&events).get("A").cloned().unwrap();
        assert_eq!(a.at_bats, 0);
        assert_eq!(a.walks, 1);
        assert_eq!(a.hit_by_pitch, 1);
        assert_eq!(a.sacrifices, 2);
        assert_eq!(a.stolen_bases, 1);
        assert_eq!(a.caught_stealing, 1);
        assert_eq!(a.plate_appearances, 6);
    }

    #[test]
    fn batted_outs_split_ground_and_fly() {
        let events = vec![
            ev("A", "field_out"),
            ev("A", "force_out"),
            ev("A", "grounded_into_double_play"),
        ];
        let a = reduce_events(&events).get("A").cloned().unwrap();
        assert_eq!(a.at_bats, 3);
        assert_eq!(a.ground_outs, 1);
        assert_eq!(a.fly_outs, 2);
        assert_eq!(a.hits, 0);
    }

    #[test]
    fn unknown_code_only_ticks_appearance() {
        let events = vec![ev("A", "wild_pitch")];
        let a = reduce_events(&events).get("A").cloned().unwrap();
        assert_eq!(a.plate_appearances, 1);
        assert_eq!(a.pitches_seen, 1);
        assert_eq!(a.at_bats, 0);
        assert_eq!(a.hits, 0);
    }

    // -- Missing data --

    #[test]
    fn null_outcome_creates_participant_without_ticks() {
        let events = vec![ev("A", "")];
        let reduced = reduce_events(&events);
        let a = reduced.get("A").unwrap();
        assert_eq!(a.plate_appearances, 0);
        assert_eq!(a.pitches_seen, 0);
        assert_eq!(a, &ParticipantAccumulator::new("A", "NYY"));
    }

    #[test]
    fn hard_hit_counts_regardless_of_outcome() {
        let events = vec![
            ev("A", "field_out").with_exit_velocity(95.0),
            ev("A", "").with_exit_velocity(104.2),
            ev("A", "single").with_exit_velocity(94.9),
        ];
        let a = reduce_events(&events).get("A").cloned().unwrap();
        assert_eq!(a.hard_hit_balls, 2);
        assert_eq!(a.plate_appearances, 2);
    }

    #[test]
    fn events_without_participant_are_skipped() {
        let events = vec![ev("", "home_run"), ev("   ", "single"), ev("B", "walk")];
        let reduced = reduce_events(&events);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced.names().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn team_taken_from_first_labelled_event() {
        let events = vec![
            RawEvent::new("A", "", Some(OutcomeCode::Walk)),
            RawEvent::new("A", "LAD", Some(OutcomeCode::Single)),
            RawEvent::new("A", "SD", Some(OutcomeCode::Single)),
        ];
        let a = reduce_events(&events).get("A").cloned().unwrap();
        assert_eq!(a.team, "LAD");
    }

    #[test]
    fn names_are_trimmed() {
        let events = vec![ev(" Juan Soto ", "single"), ev("Juan Soto", "double")];
        let reduced = reduce_events(&events);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced.get("Juan Soto").unwrap().hits, 2);
    }

    // -- Properties --

    #[test]
    fn reduction_is_idempotent() {
        let events: Vec<RawEvent> = all_codes()
            .into_iter()
            .enumerate()
            .map(|(i, code)| ev(if i % 2 == 0 { "A" } else { "B" }, code))
            .collect();
        assert_eq!(reduce_events(&events), reduce_events(&events));
    }

    #[test]
    fn order_across_participants_does_not_matter() {
        let a_events: Vec<RawEvent> = all_codes().into_iter().map(|c| ev("A", c)).collect();
        let b_events: Vec<RawEvent> = all_codes().into_iter().rev().map(|c| ev("B", c)).collect();

        let grouped: Vec<RawEvent> = a_events.iter().chain(b_events.iter()).cloned().collect();
        let interleaved: Vec<RawEvent> = a_events
            .iter()
            .zip(b_events.iter())
            .flat_map(|(a, b)| [b.clone(), a.clone()])
            .collect();

        let first = reduce_events(&grouped);
        let second = reduce_events(&interleaved);
        assert_eq!(first.get("A"), second.get("A"));
        assert_eq!(first.get("B"), second.get("B"));
    }

    #[test]
    fn counting_consistency_holds() {
        let events: Vec<RawEvent> = all_codes()
            .into_iter()
            .cycle()
            .take(90)
            .enumerate()
            .map(|(i, code)| ev(["A", "B", "C", "D"][i % 4], code))
            .collect();
        for acc in &reduce_events(&events) {
            assert!(acc.total_bases >= acc.hits, "{}: TB < H", acc.name);
            assert!(acc.hits <= acc.at_bats, "{}: H > AB", acc.name);
        }
    }

    #[test]
    fn participants_keep_first_seen_order() {
        let events = vec![ev("C", "walk"), ev("A", "walk"), ev("C", "single"), ev("B", "walk")];
        let reduced = reduce_events(&events);
        assert_eq!(reduced.names().collect::<Vec<_>>(), vec!["C", "A", "B"]);
    }
}
