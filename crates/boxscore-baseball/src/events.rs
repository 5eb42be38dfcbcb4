// Raw play events and the outcome-code vocabulary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// OutcomeCode
// ---------------------------------------------------------------------------

/// The result of one play.
///
/// Parsing never fails: anything outside the known vocabulary is kept as
/// `Other` so it still counts as an observed plate appearance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutcomeCode {
    Single,
    Double,
    Triple,
    HomeRun,
    Strikeout,
    Walk,
    HitByPitch,
    SacFly,
    SacBunt,
    FieldOut,
    ForceOut,
    GroundedIntoDoublePlay,
    StolenBase,
    CaughtStealing,
    Other(String),
}

impl OutcomeCode {
    /// Canonical snake_case code, e.g. `"home_run"`.
    pub fn as_str(&self) -> &str {
        match self {
            OutcomeCode::Single => "single",
            OutcomeCode::Double => "double",
            OutcomeCode::Triple => "triple",
            OutcomeCode::HomeRun => "home_run",
            OutcomeCode::Strikeout => "strikeout",
            OutcomeCode::Walk => "walk",
            OutcomeCode::HitByPitch => "hit_by_pitch",
            OutcomeCode::SacFly => "sac_fly",
            OutcomeCode::SacBunt => "sac_bunt",
            OutcomeCode::FieldOut => "field_out",
            OutcomeCode::ForceOut => "force_out",
            OutcomeCode::GroundedIntoDoublePlay => "grounded_into_double_play",
            OutcomeCode::StolenBase => "stolen_base",
            OutcomeCode::CaughtStealing => "caught_stealing",
            OutcomeCode::Other(code) => code.as_str(),
        }
    }

    /// Parse a code that may be empty. Blank input means "no outcome".
    pub fn parse_optional(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(raw.parse().unwrap_or_else(|never: Infallible| match never {}))
        }
    }

    /// Whether the code text names a ground ball (e.g. `grounded_into_double_play`).
    pub fn indicates_ground_ball(&self) -> bool {
        self.as_str().contains("ground")
    }
}

impl FromStr for OutcomeCode {
    type Err = Infallible;

    /// Case-insensitive; spaces and hyphens are read as underscores so that
    /// display strings like "Home Run" resolve to the same code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        let code = match normalized.as_str() {
            "single" => OutcomeCode::Single,
            "double" => OutcomeCode::Double,
            "triple" => OutcomeCode::Triple,
            "home_run" => OutcomeCode::HomeRun,
            "strikeout" => OutcomeCode::Strikeout,
            "walk" => OutcomeCode::Walk,
            "hit_by_pitch" => OutcomeCode::HitByPitch,
            "sac_fly" => OutcomeCode::SacFly,
            "sac_bunt" => OutcomeCode::SacBunt,
            "field_out" => OutcomeCode::FieldOut,
            "force_out" => OutcomeCode::ForceOut,
            "grounded_into_double_play" => OutcomeCode::GroundedIntoDoublePlay,
            "stolen_base" => OutcomeCode::StolenBase,
            "caught_stealing" => OutcomeCode::CaughtStealing,
            _ => OutcomeCode::Other(normalized),
        };
        Ok(code)
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OutcomeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Serde helper: `null`, a missing field and `""` all decode to `None`.
pub(crate) fn deserialize_outcome<'de, D>(deserializer: D) -> Result<Option<OutcomeCode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(OutcomeCode::parse_optional))
}

// ---------------------------------------------------------------------------
// RawEvent
// ---------------------------------------------------------------------------

/// One observed play, as handed to the reducer.
///
/// An empty `participant_name` means the play could not be attributed; the
/// reducer skips such events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, alias = "participantName", alias = "player_name")]
    pub participant_name: String,
    #[serde(default, alias = "teamLabel", alias = "team")]
    pub team_label: String,
    #[serde(
        default,
        alias = "outcomeCode",
        alias = "outcome_code",
        alias = "events",
        deserialize_with = "deserialize_outcome"
    )]
    pub outcome: Option<OutcomeCode>,
    #[serde(default, alias = "exitVelocity", alias = "hit_speed")]
    pub exit_velocity: Option<f64>,
    #[serde(default, alias = "sequenceIndex")]
    pub sequence_index: Option<u64>,
}

impl RawEvent {
    pub fn new(participant: impl Into<String>, team: impl Into<String>, outcome: Option<OutcomeCode>) -> Self {
        Self {
            participant_name: participant.into(),
            team_label: team.into(),
            outcome,
            exit_velocity: None,
            sequence_index: None,
        }
    }

    pub fn with_exit_velocity(mut self, mph: f64) -> Self {
        self.exit_velocity = Some(mph);
        self
    }

    pub fn with_sequence(mut self, index: u64) -> Self {
        self.sequence_index = Some(index);
        self
    }

    /// True when the event names a participant it can be credited to.
    pub fn is_attributable(&self) -> bool {
        !self.participant_name.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
