use foundation::bounds::Aabb2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PROP_NAME: &str = "name";
pub const PROP_VISIBLE: &str = "visible";
pub const PROP_DATA_TYPE: &str = "dataType";
pub const PROP_TIMES: &str = "times";
pub const PROP_SPEEDS: &str = "speeds";
pub const PROP_COURSES: &str = "courses";

/// `[longitude, latitude]` in degrees.
pub type Position = [f64; 2];

/// GeoJSON geometry, serialized as `{"type": .., "coordinates": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    pub fn for_each_position(&self, mut f: impl FnMut(Position)) {
        match self {
            Geometry::Point(p) => f(*p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().copied().for_each(f),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().copied().for_each(f)
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().copied().for_each(f),
        }
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        let mut points = Vec::new();
        self.for_each_position(|p| points.push(p));
        Aabb2::from_points(points)
    }

    /// The per-sample coordinate sequence of a track, if this geometry has one.
    pub fn samples(&self) -> Option<&[Position]> {
        match self {
            Geometry::LineString(ps) | Geometry::MultiPoint(ps) => Some(ps),
            _ => None,
        }
    }

    pub(crate) fn samples_mut(&mut self) -> Option<&mut Vec<Position>> {
        match self {
            Geometry::LineString(ps) | Geometry::MultiPoint(ps) => Some(ps),
            _ => None,
        }
    }
}

/// Behavioral class of a feature, read from `properties.dataType`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Track,
    Zone,
    Point,
    ReferencePoint,
    /// Map backdrop; never offered as a primary or secondary track.
    Backdrop,
}

impl DataType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "track" => Some(DataType::Track),
            "zone" => Some(DataType::Zone),
            "point" => Some(DataType::Point),
            "reference-point" => Some(DataType::ReferencePoint),
            "backdrop" => Some(DataType::Backdrop),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Track => "track",
            DataType::Zone => "zone",
            DataType::Point => "point",
            DataType::ReferencePoint => "reference-point",
            DataType::Backdrop => "backdrop",
        }
    }

    pub fn is_selectable_track(self) -> bool {
        self == DataType::Track
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get(PROP_NAME).and_then(Value::as_str)
    }

    /// Name if set, else id; used in user-facing text.
    pub fn label(&self) -> &str {
        self.name().or(self.id()).unwrap_or("unnamed feature")
    }

    /// Only an explicit `false` hides a feature.
    pub fn is_visible(&self) -> bool {
        self.properties.get(PROP_VISIBLE).and_then(Value::as_bool) != Some(false)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.properties
            .insert(PROP_VISIBLE.to_string(), Value::Bool(visible));
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.properties
            .get(PROP_DATA_TYPE)
            .and_then(Value::as_str)
            .and_then(DataType::parse)
    }

    pub fn is_track(&self) -> bool {
        self.data_type() == Some(DataType::Track)
    }

    pub fn times(&self) -> Option<&Vec<Value>> {
        self.properties.get(PROP_TIMES).and_then(Value::as_array)
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        self.geometry.as_ref().and_then(Geometry::bounds)
    }

    /// Fills `visible` when it is unset.
    pub(crate) fn apply_defaults(&mut self) {
        if !self.properties.contains_key(PROP_VISIBLE) {
            self.set_visible(true);
        }
    }
}
