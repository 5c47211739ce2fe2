//! Clipboard payloads: a single Feature, a FeatureCollection, or a bare
//! array of Features. Parsing never touches the store; a rejected payload
//! simply produces no features.

use std::fmt;

use scene::Feature;
use serde_json::Value;
use tracing::warn;

use crate::geojson::{feature_from_value, feature_to_value, features_from_collection};

#[derive(Debug)]
pub enum ClipboardError {
    InvalidJson(serde_json::Error),
    /// Valid JSON that is not a Feature, FeatureCollection or array.
    Unrecognized,
    Empty,
    InvalidFeature { index: usize, reason: String },
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::InvalidJson(err) => write!(f, "clipboard is not valid JSON: {err}"),
            ClipboardError::Unrecognized => {
                write!(f, "clipboard holds neither features nor a feature collection")
            }
            ClipboardError::Empty => write!(f, "clipboard holds no features"),
            ClipboardError::InvalidFeature { index, reason } => {
                write!(f, "invalid clipboard feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Parses clipboard text into features ready for `Mutation::AddMany`.
pub fn parse_clipboard(text: &str) -> Result<Vec<Feature>, ClipboardError> {
    parse_clipboard_inner(text).inspect_err(|err| warn!("clipboard rejected: {err}"))
}

fn parse_clipboard_inner(text: &str) -> Result<Vec<Feature>, ClipboardError> {
    let value: Value = serde_json::from_str(text).map_err(ClipboardError::InvalidJson)?;

    let features = match &value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                feature_from_value(item)
                    .map_err(|reason| ClipboardError::InvalidFeature { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::Object(obj) => match obj.get("type").and_then(Value::as_str) {
            Some("Feature") => vec![feature_from_value(&value).map_err(|reason| {
                ClipboardError::InvalidFeature { index: 0, reason }
            })?],
            Some("FeatureCollection") => {
                features_from_collection(&value).map_err(|err| match err {
                    crate::geojson::DocumentError::InvalidFeature { index, reason } => {
                        ClipboardError::InvalidFeature { index, reason }
                    }
                    _ => ClipboardError::Unrecognized,
                })?
            }
            _ => return Err(ClipboardError::Unrecognized),
        },
        _ => return Err(ClipboardError::Unrecognized),
    };

    if features.is_empty() {
        return Err(ClipboardError::Empty);
    }
    Ok(features)
}

/// Serializes features as a JSON array, the form [`parse_clipboard`] reads back.
pub fn to_clipboard<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
) -> Result<String, serde_json::Error> {
    let items: Vec<Value> = features.into_iter().map(feature_to_value).collect();
    serde_json::to_string_pretty(&Value::Array(items))
}
