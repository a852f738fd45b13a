//! Detection of the planar CRS of a survey file from a sample coordinate.
//!
//! The detector inverse-projects one coordinate pair through a table of
//! candidate systems and accepts the first one whose geographic position falls
//! inside a plausibility box for the deployment region. It returns the first
//! plausible candidate, not necessarily the true one.

use log::{debug, info};
use once_cell::sync::Lazy;

use crate::crs::{Crs, TransformProvider};

/// Geographic plausibility box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    /// Mainland Norway with some margin.
    pub fn norway() -> Self {
        Self {
            lat_min: 57.0,
            lat_max: 72.0,
            lon_min: 4.0,
            lon_max: 32.0,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// Region specific list of candidate systems.
///
/// `primary` holds systems with large false eastings (UTM class) and is tried
/// first when the sample easting exceeds `easting_threshold`. Otherwise
/// `alternate` (local transverse Mercator zones) goes first. Order inside each
/// list is significant and preserved.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CandidateTable {
    pub primary: Vec<String>,
    pub alternate: Vec<String>,
    pub easting_threshold: f64,
    pub bounds: GeoBounds,
}

impl CandidateTable {
    /// EUREF89 UTM zones 32-35 and 31, then NTM zones 5-30 and NTM13.
    pub fn norway() -> Self {
        let primary = [25832, 25833, 25834, 25835, 25831]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let mut alternate: Vec<String> = (5105..=5130).map(|c: u32| c.to_string()).collect();
        alternate.push("5973".to_string());
        Self {
            primary,
            alternate,
            easting_threshold: 200_000.0,
            bounds: GeoBounds::norway(),
        }
    }

    /// Candidates in the order they are tried for a sample `easting`.
    pub fn ordered_for(&self, easting: f64) -> Vec<Crs> {
        let (first, second) = if easting > self.easting_threshold {
            (&self.primary, &self.alternate)
        } else {
            (&self.alternate, &self.primary)
        };
        first.iter().chain(second).map(|id| Crs::parse(id)).collect()
    }
}

impl Default for CandidateTable {
    fn default() -> Self {
        Self::norway()
    }
}

/// Candidate table used when a conversion does not configure its own.
pub static DEFAULT_CANDIDATES: Lazy<CandidateTable> = Lazy::new(CandidateTable::norway);

/// Outcome of a successful detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub crs: Crs,
    /// `true` when the sample had to be read as (easting, northing) instead
    /// of (northing, easting).
    pub swapped: bool,
}

/// Finds the first candidate that places `(val1, val2)` inside the table's
/// bounds.
///
/// The pair is first read as (northing, easting), then swapped. Candidates the
/// provider rejects, or that fail to transform the point, are skipped.
pub fn detect_crs(
    provider: &dyn TransformProvider,
    table: &CandidateTable,
    val1: f64,
    val2: f64,
) -> Option<Detection> {
    let orderings = [(val1, val2, false), (val2, val1, true)];
    for (northing, easting, swapped) in orderings {
        for crs in table.ordered_for(easting) {
            let transform = match provider.geographic(&crs) {
                Ok(t) => t,
                Err(e) => {
                    debug!("Skipping candidate {}: {}", crs, e);
                    continue;
                }
            };
            let (lon, lat) = match transform.to_lon_lat(easting, northing) {
                Ok(ll) => ll,
                Err(e) => {
                    debug!("Skipping candidate {}: {}", crs, e);
                    continue;
                }
            };
            if table.bounds.contains(lon, lat) {
                info!(
                    "Detected CRS {} (swapped axes: {}) at lon {:.5}, lat {:.5}",
                    crs, swapped, lon, lat
                );
                return Some(Detection { crs, swapped });
            }
            debug!("Candidate {} places sample outside bounds ({:.4}, {:.4})", crs, lon, lat);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::GeographicTransform;
    use crate::error::{Error, Result};

    /// Knows a single EPSG code.
    struct OnlyOne {
        accepted: u32,
    }

    /// Maps (E, N) to (E / 1e4, N / 1e5).
    struct Scaled;

    impl GeographicTransform for Scaled {
        fn to_lon_lat(&self, easting: f64, northing: f64) -> Result<(f64, f64)> {
            Ok((easting / 1e4, northing / 1e5))
        }
    }

    impl TransformProvider for OnlyOne {
        fn geographic(&self, source: &Crs) -> Result<Box<dyn GeographicTransform>> {
            if source.epsg() == Some(self.accepted) {
                Ok(Box::new(Scaled))
            } else {
                Err(Error::UnknownCrs {
                    crs: source.code(),
                    reason: "not in test table".to_string(),
                })
            }
        }
    }

    #[test]
    fn norway_table_order() {
        let table = CandidateTable::norway();
        let utm_first: Vec<String> = table.ordered_for(600_000.0).iter().map(Crs::code).collect();
        assert_eq!(utm_first.len(), 32);
        assert_eq!(&utm_first[..5], &["25832", "25833", "25834", "25835", "25831"]);
        assert_eq!(utm_first[5], "5105");
        assert_eq!(utm_first[31], "5973");

        let ntm_first: Vec<String> = table.ordered_for(100_000.0).iter().map(Crs::code).collect();
        assert_eq!(ntm_first[0], "5105");
        assert_eq!(ntm_first[26], "5973");
        assert_eq!(ntm_first[27], "25832");
    }

    #[test]
    fn detects_in_given_order() {
        let provider = OnlyOne { accepted: 25833 };
        // N = 6_500_000 -> lat 65, E = 150_000 -> lon 15
        let found = detect_crs(&provider, &DEFAULT_CANDIDATES, 6_500_000.0, 150_000.0).unwrap();
        assert_eq!(found.crs, Crs::from_epsg(25833));
        assert!(!found.swapped);
    }

    #[test]
    fn detects_swapped_axes() {
        let provider = OnlyOne { accepted: 5110 };
        let found = detect_crs(&provider, &DEFAULT_CANDIDATES, 150_000.0, 6_500_000.0).unwrap();
        assert_eq!(found.crs.code(), "5110");
        assert!(found.swapped);
    }

    #[test]
    fn implausible_everywhere_is_none() {
        let provider = OnlyOne { accepted: 25832 };
        assert_eq!(detect_crs(&provider, &DEFAULT_CANDIDATES, 0.0, 0.0), None);
    }

    #[test]
    fn repeated_calls_agree() {
        let provider = OnlyOne { accepted: 25835 };
        let a = detect_crs(&provider, &DEFAULT_CANDIDATES, 6_500_000.0, 150_000.0);
        let b = detect_crs(&provider, &DEFAULT_CANDIDATES, 6_500_000.0, 150_000.0);
        assert_eq!(a, b);
        assert!(a.is_some());
    }
}
