//! Coordinate reference system utilities built on top of the `proj` crate.

use std::fmt;

use proj::Proj;

use crate::error::{Error, Result};

/// EPSG code of geographic WGS84.
pub const WGS84_EPSG: u32 = 4326;

/// Source CRS used when none is given, detected or recognised
/// (ETRS89 / UTM zone 32N).
pub const FALLBACK_EPSG: u32 = 25832;

/// Representation of a coordinate reference system.
///
/// A CRS is stored as a definition string understood by PROJ. When created
/// from an EPSG code the numeric value is retained so it can be reported in
/// output without the `EPSG:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs {
    definition: String,
    epsg: Option<u32>,
}

impl Crs {
    /// Creates a new CRS from the given EPSG code.
    pub fn from_epsg(code: u32) -> Self {
        Self {
            definition: format!("EPSG:{}", code),
            epsg: Some(code),
        }
    }

    /// Creates a CRS from an arbitrary PROJ definition string.
    pub fn from_definition(definition: &str) -> Self {
        Self {
            definition: definition.to_string(),
            epsg: None,
        }
    }

    /// Interprets a user supplied identifier.
    ///
    /// Accepts bare codes (`"25832"`), prefixed codes (`"EPSG:25832"`, any
    /// case) and falls back to treating the text as a PROJ definition.
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        let code = id
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("EPSG:"))
            .map_or(id, |_| &id[5..]);
        match code.parse::<u32>() {
            Ok(code) => Self::from_epsg(code),
            Err(_) => Self::from_definition(id),
        }
    }

    /// Returns the EPSG code for this CRS, if available.
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Returns the underlying definition string.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Identifier reported in output: the bare EPSG code when known.
    pub fn code(&self) -> String {
        match self.epsg {
            Some(code) => code.to_string(),
            None => self.definition.clone(),
        }
    }

    /// Geographic WGS84 (EPSG:4326).
    pub fn wgs84() -> Self {
        Self::from_epsg(WGS84_EPSG)
    }

    /// Default source CRS (EPSG:25832).
    pub fn fallback() -> Self {
        Self::from_epsg(FALLBACK_EPSG)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Converter from planar coordinates of one CRS to geographic lon/lat.
pub trait GeographicTransform {
    /// Returns `(longitude, latitude)` for a planar `(easting, northing)`.
    fn to_lon_lat(&self, easting: f64, northing: f64) -> Result<(f64, f64)>;
}

/// Source of [`GeographicTransform`]s.
///
/// Implementations must reject identifiers they do not know with
/// [`Error::UnknownCrs`].
pub trait TransformProvider: Send + Sync {
    fn geographic(&self, source: &Crs) -> Result<Box<dyn GeographicTransform>>;
}

/// [`TransformProvider`] backed by PROJ.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjProvider;

struct ProjTransform {
    proj: Proj,
    source: String,
}

impl GeographicTransform for ProjTransform {
    fn to_lon_lat(&self, easting: f64, northing: f64) -> Result<(f64, f64)> {
        let (lon, lat) = self
            .proj
            .convert((easting, northing))
            .map_err(|e| Error::Transform {
                crs: self.source.clone(),
                x: easting,
                y: northing,
                reason: e.to_string(),
            })?;
        if !lon.is_finite() || !lat.is_finite() {
            return Err(Error::Transform {
                crs: self.source.clone(),
                x: easting,
                y: northing,
                reason: "non-finite result".to_string(),
            });
        }
        Ok((lon, lat))
    }
}

impl TransformProvider for ProjProvider {
    fn geographic(&self, source: &Crs) -> Result<Box<dyn GeographicTransform>> {
        // new_known_crs normalises axis order, so input is (E, N) and output (lon, lat)
        let proj = Proj::new_known_crs(source.definition(), Crs::wgs84().definition(), None)
            .map_err(|e| Error::UnknownCrs {
                crs: source.code(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(ProjTransform {
            proj,
            source: source.code(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_bare_and_prefixed_codes() {
        assert_eq!(Crs::parse("25833").epsg(), Some(25833));
        assert_eq!(Crs::parse(" epsg:5110 ").epsg(), Some(5110));
        assert_eq!(Crs::parse("EPSG:4326"), Crs::wgs84());
        let custom = Crs::parse("+proj=utm +zone=32 +ellps=GRS80");
        assert_eq!(custom.epsg(), None);
        assert_eq!(custom.code(), "+proj=utm +zone=32 +ellps=GRS80");
    }

    #[test]
    fn code_drops_prefix() {
        assert_eq!(Crs::fallback().code(), "25832");
        assert_eq!(Crs::fallback().definition(), "EPSG:25832");
        assert_eq!(Crs::from_epsg(5973).to_string(), "5973");
    }
}
