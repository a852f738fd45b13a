//! Vertical profile resolution: station to height.
//!
//! Two strategies sit behind [`VerticalProfile`]:
//!
//! * [`LinearProfile`] interpolates linearly between samples. Samples sharing
//!   a station keep the last one read.
//! * [`SmoothedProfile`] averages samples sharing a station, optionally
//!   replaces sharp grade breaks with parabolic vertical curves, and fits an
//!   interpolating spline through the result. It can also low-pass the final
//!   heights of a dense polyline.
//!
//! Both clamp to the first/last height outside the sampled range. Numeric
//! trouble in the smoothed path falls back to linear interpolation of the
//! averaged samples.

pub mod filter;
pub mod spline;

use log::{debug, warn};

use crate::config::ProfileSettings;
use filter::{gaussian_filter, sigma_for_len};
use spline::CubicSpline;

/// One height observation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerticalSample {
    pub station: f64,
    pub height: f64,
}

impl VerticalSample {
    pub fn new(station: f64, height: f64) -> Self {
        Self { station, height }
    }
}

/// Height along the alignment as a function of station.
pub trait VerticalProfile {
    fn height_at(&self, station: f64) -> f64;

    /// Post-processes the heights of a finished dense polyline whose points
    /// sit at `stations`. The default leaves them untouched.
    fn refine_heights(&self, _stations: &[f64], _heights: &mut [f64]) {}
}

/// Splits sorted samples into runs whose stations lie within `tolerance` of
/// the run's first station.
fn station_runs(samples: &[VerticalSample], tolerance: f64) -> Vec<&[VerticalSample]> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < samples.len() {
        let anchor = samples[i].station;
        let mut j = i + 1;
        while j < samples.len() && (samples[j].station - anchor).abs() < tolerance {
            j += 1;
        }
        runs.push(&samples[i..j]);
        i = j;
    }
    runs
}

fn sorted(samples: &[VerticalSample]) -> Vec<VerticalSample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.station.total_cmp(&b.station));
    sorted
}

/// Collapses near-equal stations, keeping the last sample of each run.
pub fn dedup_keep_last(samples: &[VerticalSample], tolerance: f64) -> Vec<VerticalSample> {
    let sorted = sorted(samples);
    station_runs(&sorted, tolerance)
        .into_iter()
        .filter_map(|run| run.last().copied())
        .collect()
}

/// Collapses near-equal stations into one sample at the run's first station
/// with the mean height.
pub fn dedup_average(samples: &[VerticalSample], tolerance: f64) -> Vec<VerticalSample> {
    let sorted = sorted(samples);
    station_runs(&sorted, tolerance)
        .into_iter()
        .map(|run| {
            let mean = run.iter().map(|s| s.height).sum::<f64>() / run.len() as f64;
            VerticalSample::new(run[0].station, mean)
        })
        .collect()
}

/// Piecewise linear profile.
#[derive(Debug, Clone, Default)]
pub struct LinearProfile {
    samples: Vec<VerticalSample>,
}

impl LinearProfile {
    /// Builds the profile, keeping the last of any near-equal stations.
    pub fn new(samples: &[VerticalSample], tolerance: f64) -> Self {
        Self {
            samples: dedup_keep_last(samples, tolerance),
        }
    }

    /// Builds the profile from samples that are already sorted and unique.
    fn from_unique(samples: Vec<VerticalSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[VerticalSample] {
        &self.samples
    }
}

impl VerticalProfile for LinearProfile {
    fn height_at(&self, station: f64) -> f64 {
        let (Some(first), Some(last)) = (self.samples.first(), self.samples.last()) else {
            return 0.0;
        };
        if station.is_nan() || station <= first.station {
            return first.height;
        }
        if station >= last.station {
            return last.height;
        }
        let j = self.samples.partition_point(|s| s.station <= station);
        let a = self.samples[j - 1];
        let b = self.samples[j];
        if b.station == a.station {
            return a.height;
        }
        let t = (station - a.station) / (b.station - a.station);
        a.height + t * (b.height - a.height)
    }
}

/// Height on a parabolic vertical curve `x` units past its start.
fn parabola_height(start_elev: f64, start_grade: f64, end_grade: f64, length: f64, x: f64) -> f64 {
    start_elev + start_grade * x + 0.5 * (end_grade - start_grade) / length * x * x
}

/// Replaces interior break points whose grade change exceeds the configured
/// threshold with samples along a parabolic vertical curve.
///
/// Each curve is centred on its break point, nominally `curve_length` long and
/// clipped to the midpoints towards the neighbouring samples. Break points
/// below the threshold pass through unchanged. Input must be sorted and
/// unique; output is too.
pub fn synthesize_vertical_curves(
    samples: &[VerticalSample],
    settings: &ProfileSettings,
) -> Vec<VerticalSample> {
    if samples.len() < 3 {
        return samples.to_vec();
    }
    let count = settings.curve_samples.max(2);
    let half = settings.curve_length / 2.0;
    let mut out = vec![samples[0]];
    let mut curves = 0;
    for w in samples.windows(3) {
        let (prev, curr, next) = (w[0], w[1], w[2]);
        let grade_in = if curr.station > prev.station {
            (curr.height - prev.height) / (curr.station - prev.station)
        } else {
            0.0
        };
        let grade_out = if next.station > curr.station {
            (next.height - curr.height) / (next.station - curr.station)
        } else {
            0.0
        };
        let delta = grade_out - grade_in;
        let start = (curr.station - half).max(0.5 * (prev.station + curr.station));
        let end = (curr.station + half).min(0.5 * (curr.station + next.station));
        let length = end - start;
        if delta.abs() <= settings.grade_threshold || length <= 0.0 {
            out.push(curr);
            continue;
        }
        let start_elev = curr.height - grade_in * (curr.station - start);
        for j in 0..count {
            let x = j as f64 / (count - 1) as f64 * length;
            let height = parabola_height(start_elev, grade_in, grade_out, length, x);
            out.push(VerticalSample::new(start + x, height));
        }
        curves += 1;
    }
    out.push(samples[samples.len() - 1]);
    debug!(
        "Vertical curves: {} break points expanded, {} -> {} samples",
        curves,
        samples.len(),
        out.len()
    );
    // neighbouring curves may meet at a shared midpoint
    dedup_average(&out, settings.duplicate_tolerance)
}

/// Spline based profile with linear fallback.
#[derive(Debug, Clone)]
pub struct SmoothedProfile {
    spline: Option<CubicSpline>,
    fallback: LinearProfile,
    low_pass: bool,
}

impl SmoothedProfile {
    pub fn new(samples: &[VerticalSample], settings: &ProfileSettings) -> Self {
        let averaged = dedup_average(samples, settings.duplicate_tolerance);
        let knots = if settings.vertical_curves {
            synthesize_vertical_curves(&averaged, settings)
        } else {
            averaged.clone()
        };
        // fewer than three knots: the spline degree drops to linear anyway
        let spline = if knots.len() >= 3 {
            let xs: Vec<f64> = knots.iter().map(|s| s.station).collect();
            let ys: Vec<f64> = knots.iter().map(|s| s.height).collect();
            match CubicSpline::fit(&xs, &ys) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("Falling back to linear heights: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self {
            spline,
            fallback: LinearProfile::from_unique(averaged),
            low_pass: settings.low_pass,
        }
    }

    /// `true` when heights come from the spline rather than the fallback.
    pub fn is_spline(&self) -> bool {
        self.spline.is_some()
    }
}

impl VerticalProfile for SmoothedProfile {
    fn height_at(&self, station: f64) -> f64 {
        self.spline
            .as_ref()
            .map(|s| s.evaluate(station))
            .filter(|h| h.is_finite())
            .unwrap_or_else(|| self.fallback.height_at(station))
    }

    fn refine_heights(&self, stations: &[f64], heights: &mut [f64]) {
        if !self.low_pass || heights.len() < 3 {
            return;
        }
        let sigma = sigma_for_len(heights.len());
        match gaussian_filter(heights, sigma) {
            Ok(filtered) => {
                for ((h, f), s) in heights.iter_mut().zip(filtered).zip(stations) {
                    *h = if f.is_finite() { f } else { self.fallback.height_at(*s) };
                }
            }
            Err(e) => {
                warn!("Low-pass failed, using linear heights: {}", e);
                for (h, s) in heights.iter_mut().zip(stations) {
                    *h = self.fallback.height_at(*s);
                }
            }
        }
    }
}

/// Builds the profile strategy selected by `smooth_vertical`.
pub fn build_profile(
    samples: &[VerticalSample],
    smooth_vertical: bool,
    settings: &ProfileSettings,
) -> Box<dyn VerticalProfile> {
    if smooth_vertical {
        Box::new(SmoothedProfile::new(samples, settings))
    } else {
        Box::new(LinearProfile::new(samples, settings.duplicate_tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pairs: &[(f64, f64)]) -> Vec<VerticalSample> {
        pairs.iter().map(|&(s, h)| VerticalSample::new(s, h)).collect()
    }

    #[test]
    fn non_finite_station_is_clamped() {
        let p = LinearProfile::new(&samples(&[(0.0, 10.0), (100.0, 20.0)]), 0.001);
        assert_eq!(p.height_at(f64::NAN), 10.0);
        assert_eq!(p.height_at(f64::NEG_INFINITY), 10.0);
        assert_eq!(p.height_at(f64::INFINITY), 20.0);

        let s = SmoothedProfile::new(
            &samples(&[(0.0, 10.0), (50.0, 11.0), (100.0, 20.0)]),
            &ProfileSettings::default(),
        );
        assert_eq!(s.height_at(f64::NAN), 10.0);
        assert_eq!(s.height_at(f64::INFINITY), 20.0);
    }

    #[test]
    fn empty_profile_is_zero() {
        let p = LinearProfile::new(&[], 0.001);
        assert_eq!(p.height_at(10.0), 0.0);
    }

    #[test]
    fn linear_interpolates_and_clamps() {
        let p = LinearProfile::new(&samples(&[(0.0, 10.0), (100.0, 20.0)]), 0.001);
        assert_eq!(p.height_at(-5.0), 10.0);
        assert_eq!(p.height_at(150.0), 20.0);
        assert!((p.height_at(25.0) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn linear_is_exact_at_samples() {
        let pts = samples(&[(0.0, 1.25), (13.7, 4.5), (40.1, -2.0), (41.0, 7.75)]);
        let p = LinearProfile::new(&pts, 0.001);
        for s in &pts {
            assert_eq!(p.height_at(s.station), s.height);
        }
    }

    #[test]
    fn linear_is_monotonic_between_samples() {
        let p = LinearProfile::new(&samples(&[(0.0, 0.0), (10.0, 5.0), (20.0, 1.0)]), 0.001);
        let mut last = p.height_at(10.0);
        for i in 1..=10 {
            let h = p.height_at(10.0 + i as f64);
            assert!(h <= last);
            last = h;
        }
    }

    #[test]
    fn duplicate_policies_differ() {
        let pts = samples(&[(10.0, 3.0), (0.0, 1.0), (10.0005, 5.0), (20.0, 0.0)]);
        let last = dedup_keep_last(&pts, 0.001);
        assert_eq!(last, samples(&[(0.0, 1.0), (10.0005, 5.0), (20.0, 0.0)]));
        let mean = dedup_average(&pts, 0.001);
        assert_eq!(mean, samples(&[(0.0, 1.0), (10.0, 4.0), (20.0, 0.0)]));
    }

    #[test]
    fn small_grade_change_passes_through() {
        let pts = samples(&[(0.0, 0.0), (100.0, 0.1), (200.0, 0.3)]);
        let out = synthesize_vertical_curves(&pts, &ProfileSettings::default());
        assert_eq!(out, pts);
    }

    #[test]
    fn sharp_break_becomes_parabola() {
        let pts = samples(&[(0.0, 0.0), (100.0, 0.0), (200.0, 10.0)]);
        let out = synthesize_vertical_curves(&pts, &ProfileSettings::default());
        assert_eq!(out.len(), 13);
        let curve = &out[1..12];
        assert_eq!(curve[0].station, 50.0);
        assert!((curve[10].station - 150.0).abs() < 1e-9);
        assert!(curve.iter().all(|s| s.station != 100.0 || s.height != 0.0));
        // tangent to both grades at its ends
        assert!((curve[0].height - 0.0).abs() < 1e-12);
        assert!((curve[10].height - 5.0).abs() < 1e-9);
        // the vertex height is replaced by the curve's midpoint
        assert!((curve[5].height - 1.25).abs() < 1e-9);
    }

    #[test]
    fn curves_are_clipped_to_midpoints() {
        let pts = samples(&[(0.0, 0.0), (40.0, 0.0), (80.0, 4.0), (120.0, 0.0)]);
        let out = synthesize_vertical_curves(&pts, &ProfileSettings::default());
        assert!(out.windows(2).all(|w| w[0].station < w[1].station));
        assert_eq!(out.first().unwrap().station, 0.0);
        assert_eq!(out.last().unwrap().station, 120.0);
        // two 11-sample curves sharing the midpoint at station 60
        assert_eq!(out.len(), 2 + 11 + 11 - 1);
    }

    #[test]
    fn smoothed_matches_samples_and_clamps() {
        let pts = samples(&[(0.0, 10.0), (50.0, 12.0), (100.0, 11.0), (150.0, 15.0)]);
        let settings = ProfileSettings {
            vertical_curves: false,
            ..ProfileSettings::default()
        };
        let p = SmoothedProfile::new(&pts, &settings);
        assert!(p.is_spline());
        for s in &pts {
            assert!((p.height_at(s.station) - s.height).abs() < 1e-9);
        }
        assert_eq!(p.height_at(-1.0), 10.0);
        assert_eq!(p.height_at(1000.0), 15.0);
    }

    #[test]
    fn smoothed_with_two_samples_is_linear() {
        let p = SmoothedProfile::new(
            &samples(&[(0.0, 10.0), (100.0, 20.0)]),
            &ProfileSettings::default(),
        );
        assert!(!p.is_spline());
        assert!((p.height_at(50.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn smoothed_averages_duplicates() {
        let pts = samples(&[(0.0, 0.0), (0.0, 2.0), (100.0, 1.0)]);
        let p = SmoothedProfile::new(&pts, &ProfileSettings::default());
        assert_eq!(p.height_at(0.0), 1.0);
    }

    #[test]
    fn low_pass_only_when_enabled() {
        let pts = samples(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let stations: Vec<f64> = (0..21).map(|i| i as f64).collect();
        let mut heights = vec![0.0; 21];
        heights[10] = 1.0;

        let off = SmoothedProfile::new(&pts, &ProfileSettings::default());
        let mut untouched = heights.clone();
        off.refine_heights(&stations, &mut untouched);
        assert_eq!(untouched, heights);

        let on = SmoothedProfile::new(
            &pts,
            &ProfileSettings {
                low_pass: true,
                ..ProfileSettings::default()
            },
        );
        on.refine_heights(&stations, &mut heights);
        assert!(heights[10] < 1.0 && heights[9] > 0.0);
    }

    #[test]
    fn strategy_selection() {
        let pts = samples(&[(0.0, 0.0), (100.0, 0.0), (200.0, 10.0)]);
        let settings = ProfileSettings::default();
        let linear = build_profile(&pts, false, &settings);
        let smooth = build_profile(&pts, true, &settings);
        assert_eq!(linear.height_at(100.0), 0.0);
        assert!((smooth.height_at(100.0) - 1.25).abs() < 1e-6);
    }
}
