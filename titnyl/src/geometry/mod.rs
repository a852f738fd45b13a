//! Basic geometry primitives.

mod point;
mod point3;

pub use point::Point;
pub use point3::Point3;
