//! Planar point type.

/// Planar coordinate with `x` as easting and `y` as northing.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Builds a point from survey order (northing first).
    pub fn from_northing_easting(northing: f64, easting: f64) -> Self {
        Self { x: easting, y: northing }
    }

    pub fn easting(&self) -> f64 {
        self.x
    }

    pub fn northing(&self) -> f64 {
        self.y
    }

    /// Same point with the two axes exchanged.
    pub fn swapped(self) -> Self {
        Self { x: self.y, y: self.x }
    }

    /// Direction of `other` seen from `self`, in radians from the easting axis.
    pub fn bearing_to(&self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}
