//! Conversion settings, loadable from JSON.

use std::path::Path;

use crate::alignment::DEFAULT_STEP;
use crate::detect::CandidateTable;
use crate::error::Result;

/// Tuning of the vertical profile resolver.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Samples closer than this in station are treated as one.
    pub duplicate_tolerance: f64,
    /// Replace sharp break points with parabolic vertical curves.
    pub vertical_curves: bool,
    /// Nominal length of a synthesized vertical curve.
    pub curve_length: f64,
    /// Minimum absolute grade change that gets a vertical curve.
    pub grade_threshold: f64,
    /// Number of samples along each synthesized curve.
    pub curve_samples: usize,
    /// Gaussian low-pass over the generated heights.
    pub low_pass: bool,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            duplicate_tolerance: 0.001,
            vertical_curves: true,
            curve_length: 100.0,
            grade_threshold: 0.005,
            curve_samples: 11,
            low_pass: false,
        }
    }
}

/// Options of a single conversion.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Source CRS identifier, or `"auto"` to detect it.
    pub crs: String,
    /// Dense curve integration; `false` emits segment endpoints only.
    pub smooth: bool,
    /// Smoothed vertical profile instead of piecewise linear.
    pub smooth_vertical: bool,
    /// Integration step along the alignment.
    pub step: f64,
    pub profile: ProfileSettings,
    /// Candidate table for detection; the built-in table when `None`.
    pub detection: Option<CandidateTable>,
}

/// Identifier that requests CRS detection.
pub const AUTO_CRS: &str = "auto";

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            crs: AUTO_CRS.to_string(),
            smooth: true,
            smooth_vertical: false,
            step: DEFAULT_STEP,
            profile: ProfileSettings::default(),
            detection: None,
        }
    }
}

impl ConvertOptions {
    /// Loads options from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Saves these options as pretty printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn wants_detection(&self) -> bool {
        self.crs.trim().eq_ignore_ascii_case(AUTO_CRS)
    }
}
