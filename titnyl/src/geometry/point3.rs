//! 3D point type carried between integration and reprojection.

/// Representation of a 3D point.
///
/// Before reprojection `x`/`y` hold easting/northing in the source CRS; after
/// it they hold longitude/latitude. `z` is the profile height in both cases.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// GeoJSON position `[x, y, z]`.
    pub fn to_position(self) -> Vec<f64> {
        vec![self.x, self.y, self.z]
    }
}
