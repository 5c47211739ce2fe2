use std::fmt;
use std::fs;
use std::path::Path;

use foundation::bounds::Aabb2;
use scene::{Document, Feature, FeatureCollection, Geometry, Viewport};
use serde_json::{Map, Value};

/// Foreign member carrying the stored map view alongside the features.
pub const VIEWPORT_MEMBER: &str = "viewport";

#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(err) => write!(f, "I/O error: {err}"),
            DocumentError::Json(err) => write!(f, "JSON error: {err}"),
            DocumentError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            DocumentError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// Parses one GeoJSON `Feature` object.
///
/// A `null` or absent geometry is kept as `None`. Numeric ids are read as
/// their decimal string.
pub fn feature_from_value(value: &Value) -> Result<Feature, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "feature must be an object".to_string())?;

    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "feature missing type".to_string())?;
    if ty != "Feature" {
        return Err(format!("unexpected feature type: {ty}"));
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = match obj.get("properties") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(props)) => props.clone(),
        Some(_) => return Err("properties must be an object".to_string()),
    };

    let geometry = match obj.get("geometry") {
        None | Some(Value::Null) => None,
        Some(geom) => Some(
            serde_json::from_value::<Geometry>(geom.clone())
                .map_err(|e| format!("invalid geometry: {e}"))?,
        ),
    };

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

pub fn feature_to_value(feature: &Feature) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String("Feature".to_string()));
    if let Some(id) = &feature.id {
        obj.insert("id".to_string(), Value::String(id.clone()));
    }
    obj.insert(
        "properties".to_string(),
        Value::Object(feature.properties.clone()),
    );
    let geometry = feature
        .geometry
        .as_ref()
        .and_then(|g| serde_json::to_value(g).ok())
        .unwrap_or(Value::Null);
    obj.insert("geometry".to_string(), geometry);
    Value::Object(obj)
}

/// Reads the features of a `FeatureCollection` body. The stored `bbox`
/// member is ignored; the collection derives its own.
pub fn features_from_collection(value: &Value) -> Result<Vec<Feature>, DocumentError> {
    let obj = value
        .as_object()
        .ok_or(DocumentError::NotAFeatureCollection)?;
    if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(DocumentError::NotAFeatureCollection);
    }
    let items = obj
        .get("features")
        .and_then(Value::as_array)
        .ok_or(DocumentError::NotAFeatureCollection)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            feature_from_value(item).map_err(|reason| DocumentError::InvalidFeature { index, reason })
        })
        .collect()
}

pub fn document_from_value(value: &Value) -> Result<Document, DocumentError> {
    let features = features_from_collection(value)?;
    // An unreadable stored view is dropped rather than failing the load.
    let viewport = value
        .get(VIEWPORT_MEMBER)
        .and_then(|v| serde_json::from_value::<Viewport>(v.clone()).ok());
    Ok(Document::new(FeatureCollection::new(features), viewport))
}

pub fn document_to_value(document: &Document) -> Value {
    let mut root = collection_to_value(&document.collection);
    if let Some(viewport) = &document.viewport
        && let Ok(v) = serde_json::to_value(viewport)
        && let Value::Object(obj) = &mut root
    {
        obj.insert(VIEWPORT_MEMBER.to_string(), v);
    }
    root
}

/// Serializes a collection. `bbox` is omitted when nothing is visible.
pub fn collection_to_value(collection: &FeatureCollection) -> Value {
    let mut root = Map::new();
    root.insert(
        "type".to_string(),
        Value::String("FeatureCollection".to_string()),
    );
    if let Some(bbox) = collection.bbox() {
        root.insert("bbox".to_string(), bbox_to_value(&bbox));
    }
    let features = collection.features().iter().map(feature_to_value).collect();
    root.insert("features".to_string(), Value::Array(features));
    Value::Object(root)
}

fn bbox_to_value(bbox: &Aabb2) -> Value {
    Value::Array(bbox.to_array().into_iter().map(Value::from).collect())
}

pub fn document_from_str(payload: &str) -> Result<Document, DocumentError> {
    let value: Value = serde_json::from_str(payload).map_err(DocumentError::Json)?;
    document_from_value(&value)
}

pub fn document_to_string_pretty(document: &Document) -> Result<String, DocumentError> {
    serde_json::to_string_pretty(&document_to_value(document)).map_err(DocumentError::Json)
}

pub fn load_document(path: impl AsRef<Path>) -> Result<Document, DocumentError> {
    let payload = fs::read_to_string(path.as_ref()).map_err(DocumentError::Io)?;
    document_from_str(&payload)
}

pub fn save_document(path: impl AsRef<Path>, document: &Document) -> Result<(), DocumentError> {
    let payload = document_to_string_pretty(document)?;
    fs::write(path.as_ref(), payload).map_err(DocumentError::Io)
}
