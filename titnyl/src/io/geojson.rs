//! GeoJSON output of converted alignments.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::error::Result;
use crate::geometry::Point3;

/// Value of the `source` property on every feature.
pub const SOURCE_TAG: &str = "titnyl";

/// Properties attached to a converted alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct LineProperties {
    pub epsg: String,
    pub smooth: bool,
    pub smooth_z: bool,
    pub filename: Option<String>,
}

impl LineProperties {
    fn to_json(&self) -> JsonObject {
        let mut props = JsonObject::new();
        props.insert("source".to_string(), JsonValue::from(SOURCE_TAG));
        props.insert("epsg".to_string(), JsonValue::from(self.epsg.clone()));
        props.insert("smooth".to_string(), JsonValue::from(self.smooth));
        props.insert("smooth_z".to_string(), JsonValue::from(self.smooth_z));
        if let Some(name) = &self.filename {
            props.insert("filename".to_string(), JsonValue::from(name.clone()));
        }
        props
    }
}

/// LineString feature with `[lon, lat, height]` positions.
pub fn line_feature(points: &[Point3], properties: &LineProperties) -> Feature {
    let coords = points.iter().map(|p| p.to_position()).collect();
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coords))),
        id: None,
        properties: Some(properties.to_json()),
        foreign_members: None,
    }
}

pub fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Empty collection carrying an explanatory `message` member.
pub fn empty_collection(message: &str) -> FeatureCollection {
    let mut members = JsonObject::new();
    members.insert("message".to_string(), JsonValue::from(message));
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: Some(members),
    }
}

/// Pretty printed GeoJSON text.
pub fn to_string_pretty(collection: &FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}
