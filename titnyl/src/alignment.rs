//! Horizontal alignment segments and their conversion to dense 3D polylines.
//!
//! Each segment is integrated in a local frame from its curvature, which
//! varies linearly with station (line, arc or clothoid). The local polyline is
//! then rotated so that its end direction matches the chord between the
//! surveyed endpoints, and moved onto the surveyed start point.

use log::{debug, info};
use nalgebra::{Rotation2, Vector2};

use crate::geometry::{Point, Point3};
use crate::profile::VerticalProfile;

/// Radii at or below this magnitude mean "straight".
pub const MIN_RADIUS: f64 = 1e-4;

/// Segments this short or shorter are skipped in dense mode.
pub const MIN_SEGMENT_LENGTH: f64 = 0.001;

/// Default integration step along the alignment.
pub const DEFAULT_STEP: f64 = 5.0;

/// Endpoint gap above which consecutive segments count as disjoint.
pub const JOINT_TOLERANCE: f64 = 0.01;

/// Upper bound on integration steps per segment.
pub const MAX_STEPS: usize = 100_000;

/// Maps a radius read from file to its stored form: straight is `INFINITY`.
pub fn normalize_radius(radius: f64) -> f64 {
    if radius.abs() > MIN_RADIUS {
        radius
    } else {
        f64::INFINITY
    }
}

/// Signed curvature for a stored radius. Positive radii curve clockwise.
pub fn curvature(radius: f64) -> f64 {
    if radius.is_finite() && radius.abs() > MIN_RADIUS {
        -1.0 / radius
    } else {
        0.0
    }
}

/// One horizontal element: line, arc or transition curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySegment {
    pub sequence: f64,
    pub start_station: f64,
    pub end_station: f64,
    /// Signed radius at the start, `INFINITY` for straight.
    pub start_radius: f64,
    /// Signed radius at the end, `INFINITY` for straight.
    pub end_radius: f64,
    /// Clothoid parameter A as given in the file.
    pub shape_parameter: f64,
    pub start: Point,
    pub end: Point,
}

impl GeometrySegment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: f64,
        start_station: f64,
        end_station: f64,
        start_radius: f64,
        end_radius: f64,
        shape_parameter: f64,
        start: Point,
        end: Point,
    ) -> Self {
        Self {
            sequence,
            start_station,
            end_station,
            start_radius: normalize_radius(start_radius),
            end_radius: normalize_radius(end_radius),
            shape_parameter,
            start,
            end,
        }
    }

    pub fn length(&self) -> f64 {
        self.end_station - self.start_station
    }

    /// Finite and long enough to integrate.
    pub fn is_usable(&self) -> bool {
        let length = self.length();
        length.is_finite() && length > MIN_SEGMENT_LENGTH
    }

    pub fn start_curvature(&self) -> f64 {
        curvature(self.start_radius)
    }

    pub fn end_curvature(&self) -> f64 {
        curvature(self.end_radius)
    }

    /// Direction of the surveyed chord from start to end.
    pub fn chord_bearing(&self) -> f64 {
        self.start.bearing_to(self.end)
    }

    /// Exchanges easting and northing of both endpoints.
    pub fn swap_axes(&mut self) {
        self.start = self.start.swapped();
        self.end = self.end.swapped();
    }
}

/// Number of integration steps for a segment of `length`, between 2 and
/// [`MAX_STEPS`].
pub fn step_count(length: f64, step: f64) -> usize {
    let step = if step.is_finite() && step > 0.0 { step } else { DEFAULT_STEP };
    let steps = (length / step).ceil();
    if steps.is_nan() {
        return 2;
    }
    (steps.min(MAX_STEPS as f64) as usize).max(2)
}

/// Integrates the segment's curvature in a local frame starting at the origin
/// with heading zero. Returns the polyline and the station spacing.
fn local_polyline(segment: &GeometrySegment, step: f64) -> (Vec<Vector2<f64>>, f64) {
    let length = segment.length();
    let steps = step_count(length, step);
    let ds = length / steps as f64;
    let k_start = segment.start_curvature();
    let dk = segment.end_curvature() - k_start;

    let mut current = Vector2::zeros();
    let mut points = Vec::with_capacity(steps + 1);
    points.push(current);
    for i in 1..=steps {
        let s_mid = ((i - 1) as f64 * ds + i as f64 * ds) / 2.0;
        let theta = k_start * s_mid + 0.5 * (dk / length) * s_mid * s_mid;
        current += Vector2::new(theta.cos(), theta.sin()) * ds;
        points.push(current);
    }
    (points, ds)
}

/// Planar points of a segment with their stations, placed on the surveyed
/// start and oriented along the surveyed chord.
pub fn trace_segment(segment: &GeometrySegment, step: f64) -> Vec<(f64, Point)> {
    let (local, ds) = local_polyline(segment, step);
    let local_end = local[local.len() - 1];
    let rotation = Rotation2::new(segment.chord_bearing() - local_end.y.atan2(local_end.x));
    local
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let r = rotation * *v;
            let station = segment.start_station + i as f64 * ds;
            (station, Point::new(segment.start.x + r.x, segment.start.y + r.y))
        })
        .collect()
}

/// Dense 3D points along one segment, heights taken from `profile`.
pub fn integrate_segment(
    segment: &GeometrySegment,
    profile: &dyn VerticalProfile,
    step: f64,
) -> Vec<Point3> {
    trace_segment(segment, step)
        .into_iter()
        .map(|(station, p)| Point3::new(p.x, p.y, profile.height_at(station)))
        .collect()
}

/// How segments are turned into a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblyMode {
    /// Integrate every segment densely.
    #[default]
    Dense,
    /// Only surveyed endpoints.
    EndpointsOnly,
}

/// Concatenates the dense polylines of all usable segments, then lets the
/// profile refine the whole height sequence.
pub fn assemble_dense(
    segments: &[GeometrySegment],
    profile: &dyn VerticalProfile,
    step: f64,
) -> Vec<Point3> {
    let mut stations = Vec::new();
    let mut planar = Vec::new();
    for segment in segments {
        if !segment.is_usable() {
            debug!(
                "Skipping segment {} with length {:.4}",
                segment.sequence,
                segment.length()
            );
            continue;
        }
        for (station, p) in trace_segment(segment, step) {
            stations.push(station);
            planar.push(p);
        }
    }
    let mut heights: Vec<f64> = stations.iter().map(|&s| profile.height_at(s)).collect();
    profile.refine_heights(&stations, &mut heights);
    planar
        .into_iter()
        .zip(heights)
        .map(|(p, z)| Point3::new(p.x, p.y, z))
        .collect()
}

/// Start of the first segment and end of every segment. A gap between one
/// segment's end and the next one's start gets the next start as an extra
/// point.
pub fn assemble_endpoints(
    segments: &[GeometrySegment],
    profile: &dyn VerticalProfile,
) -> Vec<Point3> {
    let Some(first) = segments.first() else {
        return Vec::new();
    };
    let at = |p: Point, station: f64| Point3::new(p.x, p.y, profile.height_at(station));
    let mut points = vec![at(first.start, first.start_station)];
    for (i, segment) in segments.iter().enumerate() {
        points.push(at(segment.end, segment.end_station));
        if let Some(next) = segments.get(i + 1) {
            let gap_x = (next.start.x - segment.end.x).abs();
            let gap_y = (next.start.y - segment.end.y).abs();
            if gap_x > JOINT_TOLERANCE || gap_y > JOINT_TOLERANCE {
                debug!("Gap after segment {}: bridging to next start", segment.sequence);
                points.push(at(next.start, next.start_station));
            }
        }
    }
    points
}

/// Builds the full polyline in the requested mode.
pub fn assemble(
    segments: &[GeometrySegment],
    profile: &dyn VerticalProfile,
    mode: AssemblyMode,
    step: f64,
) -> Vec<Point3> {
    let points = match mode {
        AssemblyMode::Dense => assemble_dense(segments, profile, step),
        AssemblyMode::EndpointsOnly => assemble_endpoints(segments, profile),
    };
    info!(
        "Assembled {} points from {} segments ({:?})",
        points.len(),
        segments.len(),
        mode
    );
    points
}
