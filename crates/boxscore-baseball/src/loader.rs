// Event file loading: JSON arrays or CSV tables of raw play events.
//
// CSV columns: participant_name, team_label, outcome, exit_velocity,
// sequence_index (extra columns are ignored). A malformed CSV row is skipped
// with a warning. A JSON document that is not an array of event objects is
// rejected outright.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::events::{OutcomeCode, RawEvent};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("unsupported event file extension for {path} (expected .json or .csv)")]
    UnsupportedFormat { path: String },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawCsvEvent {
    #[serde(default, alias = "player_name", alias = "participant")]
    participant_name: String,
    #[serde(default, alias = "team")]
    team_label: String,
    #[serde(default, alias = "outcome_code", alias = "events")]
    outcome: Option<String>,
    #[serde(default, alias = "hit_speed")]
    exit_velocity: Option<f64>,
    #[serde(default)]
    sequence_index: Option<u64>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

/// Read CSV events. Rows that fail to parse are skipped.
pub fn events_from_csv<R: Read>(rdr: R) -> Result<Vec<RawEvent>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut events = Vec::new();
    for (row, result) in reader.deserialize::<RawCsvEvent>().enumerate() {
        match result {
            Ok(raw) => {
                if raw.exit_velocity.is_some_and(|v| !v.is_finite()) {
                    warn!("skipping event row {}: non-finite exit velocity", row + 1);
                    continue;
                }
                events.push(RawEvent {
                    participant_name: raw.participant_name,
                    team_label: raw.team_label,
                    outcome: raw.outcome.as_deref().and_then(OutcomeCode::parse_optional),
                    exit_velocity: raw.exit_velocity,
                    sequence_index: raw.sequence_index,
                });
            }
            Err(e) => {
                warn!("skipping malformed event row {}: {}", row + 1, e);
            }
        }
    }
    Ok(events)
}

/// Read a JSON array of events.
pub fn events_from_json<R: Read>(rdr: R) -> Result<Vec<RawEvent>, serde_json::Error> {
    serde_json::from_reader(rdr)
}

// ---------------------------------------------------------------------------
// Path-based loader
// ---------------------------------------------------------------------------

/// Load events from `path`, choosing the format from its extension.
pub fn load_events(path: &Path) -> Result<Vec<RawEvent>, LoadError> {
    let path_str = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let file = || {
        std::fs::File::open(path).map_err(|e| LoadError::Io {
            path: path_str.clone(),
            source: e,
        })
    };

    let events = match extension.as_deref() {
        Some("json") => events_from_json(file()?).map_err(|e| LoadError::Json {
            path: path_str.clone(),
            source: e,
        })?,
        Some("csv") => events_from_csv(file()?).map_err(|e| LoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?,
        _ => return Err(LoadError::UnsupportedFormat { path: path_str }),
    };

    info!("Loaded {} events from {}", events.len(), path_str);
    Ok(events)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_events_parse() {
        let csv_data = "\
participant_name,team_label,outcome,exit_velocity,sequence_index
Aaron Judge,NYY,home_run,112.4,1
Juan Soto,NYY,walk,,2
Juan Soto,NYY,,,3";

        let events = events_from_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].outcome, Some(OutcomeCode::HomeRun));
        assert_eq!(events[0].exit_velocity, Some(112.4));
        assert_eq!(events[1].exit_velocity, None);
        assert_eq!(events[1].sequence_index, Some(2));
        assert_eq!(events[2].outcome, None);
    }

    #[test]
    fn csv_aliases_and_extra_columns() {
        let csv_data = "\
player_name,team,events,hit_speed,inning
  Mookie Betts , LAD ,Double,101.0,3";

        let events = events_from_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(events[0].participant_name, "Mookie Betts");
        assert_eq!(events[0].team_label, "LAD");
        assert_eq!(events[0].outcome, Some(OutcomeCode::Double));
    }

    #[test]
    fn malformed_csv_rows_skipped() {
        let csv_data = "\
participant_name,team_label,outcome,exit_velocity,sequence_index
Valid,NYY,single,90.0,1
Bad Speed,NYY,single,fast,2
Nan Speed,NYY,single,NaN,3
Another,BOS,walk,,4";

        let events = events_from_csv(csv_data.as_bytes()).unwrap();
        let names: Vec<&str> = events.iter().map(|e| e.participant_name.as_str()).collect();
        assert_eq!(names, vec!["Valid", "Another"]);
    }

    #[test]
    fn json_array_parses() {
        let json = r#"[{"participant_name": "A", "outcome": "single"}, {"participant_name": "B"}]"#;
        let events = events_from_json(json.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].outcome, None);
    }

    #[test]
    fn json_non_array_rejected() {
        assert!(events_from_json(r#"{"participant_name": "A"}"#.as_bytes()).is_err());
        assert!(events_from_json("[1, 2, 3]".as_bytes()).is_err());
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("events.json");
        std::fs::write(&json_path, r#"[{"participant_name": "A", "outcome": "triple"}]"#).unwrap();
        assert_eq!(load_events(&json_path).unwrap().len(), 1);

        let csv_path = dir.path().join("events.CSV");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "participant_name,outcome").unwrap();
        writeln!(f, "A,single").unwrap();
        writeln!(f, "B,double").unwrap();
        drop(f);
        assert_eq!(load_events(&csv_path).unwrap().len(), 2);
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("events.txt");
        std::fs::write(&txt, "nope").unwrap();
        assert!(matches!(
            load_events(&txt),
            Err(LoadError::UnsupportedFormat { .. })
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_events(&missing), Err(LoadError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"not\": \"an array\"}").unwrap();
        let err = load_events(&bad).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }
}
