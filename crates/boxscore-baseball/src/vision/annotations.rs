// Decoding of image-annotation responses into classifier inputs.
//
// Accepts either the full `images:annotate` envelope (`{"responses": [...]}`)
// or a single response object. Vision omits zero coordinates, so missing
// `x`/`y` read as 0.0.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::vision::classifier::{BoundingBox, LabelDetection, ObjectDetection, Vertex};

#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("failed to read annotation file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("annotation response is empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Envelope { responses: Vec<RawResponse> },
    Single(RawResponse),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    label_annotations: Vec<RawLabel>,
    #[serde(default, alias = "objectAnnotations")]
    localized_object_annotations: Vec<RawObject>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    bounding_poly: RawPoly,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoly {
    #[serde(default)]
    normalized_vertices: Vec<RawVertex>,
}

#[derive(Debug, Deserialize)]
struct RawVertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classifier inputs decoded from one annotated frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameAnnotations {
    pub labels: Vec<LabelDetection>,
    pub objects: Vec<ObjectDetection>,
}

fn convert(raw: RawResponse) -> FrameAnnotations {
    let labels = raw
        .label_annotations
        .into_iter()
        .map(|l| LabelDetection {
            description: l.description,
            score: l.score,
        })
        .collect();

    let objects = raw
        .localized_object_annotations
        .into_iter()
        .filter_map(|o| {
            let vertices: Vec<Vertex> = o
                .bounding_poly
                .normalized_vertices
                .iter()
                .map(|v| Vertex { x: v.x, y: v.y })
                .collect();
            match BoundingBox::from_vertices(&vertices) {
                Some(bounding_box) => Some(ObjectDetection {
                    name: o.name,
                    score: o.score,
                    bounding_box,
                }),
                None => {
                    warn!("skipping object '{}': no bounding vertices", o.name);
                    None
                }
            }
        })
        .collect();

    FrameAnnotations { labels, objects }
}

/// Parse annotations for the first frame in an annotation document.
pub fn parse_annotations(json: &str) -> Result<FrameAnnotations, AnnotationError> {
    let doc: RawDocument = serde_json::from_str(json)?;
    let response = match doc {
        RawDocument::Envelope { responses } => responses.into_iter().next().ok_or(AnnotationError::Empty)?,
        RawDocument::Single(response) => response,
    };
    Ok(convert(response))
}

fn read_annotations<R: Read>(mut rdr: R, path: &Path) -> Result<FrameAnnotations, AnnotationError> {
    let mut text = String::new();
    rdr.read_to_string(&mut text).map_err(|e| AnnotationError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_annotations(&text)
}

/// Load annotations from a JSON file.
pub fn load_annotations(path: &Path) -> Result<FrameAnnotations, AnnotationError> {
    let file = std::fs::File::open(path).map_err(|e| AnnotationError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_annotations(file, path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
