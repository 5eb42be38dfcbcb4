// Turns image-recognition detections into play signals and field positions.
//
// Pure function of its inputs: no I/O, no state. Low-confidence detections
// are dropped silently; a frame with nothing above threshold yields nothing.

use serde::Serialize;

use crate::events::{OutcomeCode, RawEvent};

/// Minimum score for a label or object detection to be considered.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Box centers lower in the frame than this are treated as deep (outfield).
pub const DEEP_Y_THRESHOLD: f64 = 0.7;
/// Box centers left of this are on the first-base side.
pub const LEFT_X_THRESHOLD: f64 = 0.3;
/// Box centers right of this are on the third-base side.
pub const RIGHT_X_THRESHOLD: f64 = 0.7;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A whole-frame label with its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDetection {
    pub description: String,
    pub score: f64,
}

/// A normalized (0..1) point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned box in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Smallest box containing every vertex. `None` for an empty polygon.
    pub fn from_vertices(vertices: &[Vertex]) -> Option<Self> {
        let first = vertices.first()?;
        let init = BoundingBox {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        Some(vertices.iter().fold(init, |b, v| BoundingBox {
            x_min: b.x_min.min(v.x),
            y_min: b.y_min.min(v.y),
            x_max: b.x_max.max(v.x),
            y_max: b.y_max.max(v.y),
        }))
    }

    pub fn center(&self) -> Vertex {
        Vertex {
            x: (self.x_min + self.x_max) / 2.0,
            y: (self.y_min + self.y_max) / 2.0,
        }
    }
}

/// A localized object with its confidence and box.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDetection {
    pub name: String,
    pub score: f64,
    pub bounding_box: BoundingBox,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// The kind of play a label suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Hit,
    Pitch,
    Run,
    Fielding,
}

impl SignalKind {
    /// Outcome code used when a signal is fed to the reducer.
    pub fn outcome_code(&self) -> &'static str {
        match self {
            SignalKind::Hit => "hit_signal",
            SignalKind::Pitch => "pitch_signal",
            SignalKind::Run => "run_signal",
            SignalKind::Fielding => "fielding_signal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SignalKind::Hit => "Batter at the plate",
            SignalKind::Pitch => "Pitcher throwing",
            SignalKind::Run => "Runner in motion",
            SignalKind::Fielding => "Fielding play",
        }
    }
}

/// A signal inferred from one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub label: String,
    pub score: f64,
}

/// Coarse field role inferred from where a person stands in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldPosition {
    Outfield,
    FirstBase,
    ThirdBase,
    Pitcher,
}

impl FieldPosition {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            FieldPosition::Outfield => "OF",
            FieldPosition::FirstBase => "1B",
            FieldPosition::ThirdBase => "3B",
            FieldPosition::Pitcher => "P",
        }
    }

    /// Deep → outfield; otherwise the horizontal thirds decide, with the
    /// near-center band read as the pitcher.
    pub fn from_center(center: Vertex) -> Self {
        if center.y > DEEP_Y_THRESHOLD {
            FieldPosition::Outfield
        } else if center.x < LEFT_X_THRESHOLD {
            FieldPosition::FirstBase
        } else if center.x > RIGHT_X_THRESHOLD {
            FieldPosition::ThirdBase
        } else {
            FieldPosition::Pitcher
        }
    }
}

/// A detected person and the position they appear to hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionTag {
    pub player_label: String,
    pub position: FieldPosition,
    pub center: Vertex,
    pub score: f64,
}

/// Everything inferred from one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedFrame {
    pub signals: Vec<Signal>,
    pub positions: Vec<PositionTag>,
}

impl ClassifiedFrame {
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.positions.is_empty()
    }

    /// Express each signal as a `RawEvent` credited to `participant`.
    ///
    /// Signal codes fall outside the outcome vocabulary, so the reducer
    /// counts them as observed appearances without touching outcome counters.
    pub fn to_raw_events(&self, participant: &str, team: &str) -> Vec<RawEvent> {
        self.signals
            .iter()
            .map(|signal| {
                RawEvent::new(
                    participant,
                    team,
                    Some(OutcomeCode::Other(signal.kind.outcome_code().to_string())),
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Label words and the signal each one implies. Checked in order.
const KEYWORDS: &[(&str, SignalKind)] = &[
    ("bat", SignalKind::Hit),
    ("batting", SignalKind::Hit),
    ("batter", SignalKind::Hit),
    ("swing", SignalKind::Hit),
    ("swinging", SignalKind::Hit),
    ("pitch", SignalKind::Pitch),
    ("pitching", SignalKind::Pitch),
    ("pitcher", SignalKind::Pitch),
    ("throw", SignalKind::Pitch),
    ("throwing", SignalKind::Pitch),
    ("run", SignalKind::Run),
    ("running", SignalKind::Run),
    ("runner", SignalKind::Run),
    ("base", SignalKind::Run),
    ("catch", SignalKind::Fielding),
    ("catching", SignalKind::Fielding),
    ("field", SignalKind::Fielding),
    ("fielding", SignalKind::Fielding),
    ("fielder", SignalKind::Fielding),
];

/// Match a label against the keyword table, word by word.
///
/// Whole words only: "Baseball bat" is a hit signal, plain "Baseball" is not
/// a run signal.
pub fn signal_for_label(description: &str) -> Option<SignalKind> {
    let lowered = description.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    KEYWORDS
        .iter()
        .find(|(keyword, _)| words.contains(keyword))
        .map(|&(_, kind)| kind)
}

/// Classify one frame's detections.
pub fn classify_events(labels: &[LabelDetection], objects: &[ObjectDetection]) -> ClassifiedFrame {
    let signals = labels
        .iter()
        .filter(|label| label.score >= CONFIDENCE_THRESHOLD)
        .filter_map(|label| {
            signal_for_label(&label.description).map(|kind| Signal {
                kind,
                label: label.description.clone(),
                score: label.score,
            })
        })
        .collect();

    let positions = objects
        .iter()
        .filter(|obj| obj.score >= CONFIDENCE_THRESHOLD && obj.name.to_lowercase().contains("person"))
        .enumerate()
        .map(|(i, person)| {
            let center = person.bounding_box.center();
            PositionTag {
                player_label: format!("Player {}", i + 1),
                position: FieldPosition::from_center(center),
                center,
                score: person.score,
            }
        })
        .collect();

    ClassifiedFrame { signals, positions }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
