//! Planar to geographic reprojection of assembled points.

use log::warn;

use crate::crs::{Crs, TransformProvider};
use crate::error::Result;
use crate::geometry::Point3;

/// Points in lon/lat/height together with the CRS they were read in.
#[derive(Debug, Clone, PartialEq)]
pub struct Reprojected {
    /// CRS actually used, which is the fallback when the requested one was
    /// not recognised.
    pub source: Crs,
    pub points: Vec<Point3>,
}

/// Transforms `(easting, northing, height)` points to
/// `(longitude, latitude, height)`.
///
/// An unknown `source` falls back to [`Crs::fallback`]. Failing to build the
/// fallback, or to transform any point, is an error.
pub fn reproject(
    provider: &dyn TransformProvider,
    source: &Crs,
    points: &[Point3],
) -> Result<Reprojected> {
    let (source, transform) = match provider.geographic(source) {
        Ok(t) => (source.clone(), t),
        Err(e) => {
            let fallback = Crs::fallback();
            warn!("{}; reprojecting from {} instead", e, fallback);
            let t = provider.geographic(&fallback)?;
            (fallback, t)
        }
    };
    let points = points
        .iter()
        .map(|p| {
            let (lon, lat) = transform.to_lon_lat(p.x, p.y)?;
            Ok(Point3::new(lon, lat, p.z))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Reprojected { source, points })
}
