//! End-to-end TIT/NYL to GeoJSON conversion.

use std::collections::BTreeMap;
use std::path::Path;

use geojson::{Feature, FeatureCollection};
use log::{info, warn};

use crate::alignment::{assemble, AssemblyMode, GeometrySegment};
use crate::config::ConvertOptions;
use crate::crs::{Crs, ProjProvider, TransformProvider};
use crate::detect::{detect_crs, DEFAULT_CANDIDATES};
use crate::error::Result;
use crate::io::geojson::{empty_collection, feature_collection, line_feature, LineProperties};
use crate::io::nyl::parse_nyl;
use crate::io::tit::parse_tit;
use crate::profile::build_profile;
use crate::reproject::reproject;

/// Message of the collection returned when a batch has no usable pairs.
pub const NO_PAIRS_MESSAGE: &str = "No matching .TIT and .NYL pairs found (matched by filename).";

/// Named text content of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub content: String,
}

impl InputFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Reads `path`, decoding UTF-8 or Latin-1, named after its file name.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = crate::io::read_text(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, content })
    }

    /// Lower-cased file name without directory and last extension.
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Chooses the source CRS for `segments`.
///
/// An explicit identifier is used as given. `"auto"` probes the first
/// segment's start; a detected axis swap is applied to every segment, and
/// failure falls back to [`Crs::fallback`].
pub fn resolve_crs(
    provider: &dyn TransformProvider,
    options: &ConvertOptions,
    segments: &mut [GeometrySegment],
) -> Crs {
    if !options.wants_detection() {
        return Crs::parse(&options.crs);
    }
    let Some(first) = segments.first() else {
        warn!("No segments to detect a CRS from, using {}", Crs::fallback());
        return Crs::fallback();
    };
    let table = options.detection.as_ref().unwrap_or(&*DEFAULT_CANDIDATES);
    match detect_crs(provider, table, first.start.northing(), first.start.easting()) {
        Some(detection) => {
            if detection.swapped {
                segments.iter_mut().for_each(GeometrySegment::swap_axes);
            }
            detection.crs
        }
        None => {
            warn!("CRS detection failed, using {}", Crs::fallback());
            Crs::fallback()
        }
    }
}

/// Converts one horizontal/vertical pair into a single LineString feature.
pub fn convert_feature(
    provider: &dyn TransformProvider,
    horizontal: &str,
    vertical: &str,
    options: &ConvertOptions,
    filename: Option<&str>,
) -> Result<Feature> {
    let mut segments = parse_tit(horizontal);
    let samples = parse_nyl(vertical);
    if segments.is_empty() {
        warn!("No usable horizontal records in {}", filename.unwrap_or("input"));
    }

    let crs = resolve_crs(provider, options, &mut segments);
    let profile = build_profile(&samples, options.smooth_vertical, &options.profile);
    let mode = if options.smooth {
        AssemblyMode::Dense
    } else {
        AssemblyMode::EndpointsOnly
    };
    let points = assemble(&segments, profile.as_ref(), mode, options.step);
    let projected = reproject(provider, &crs, &points)?;

    info!(
        "Converted {} segments and {} height samples to {} points in {}",
        segments.len(),
        samples.len(),
        projected.points.len(),
        projected.source
    );
    let properties = LineProperties {
        epsg: projected.source.code(),
        smooth: options.smooth,
        smooth_z: options.smooth_vertical,
        filename: filename.map(str::to_string),
    };
    Ok(line_feature(&projected.points, &properties))
}

/// [`convert_feature`] wrapped in a collection, using a custom provider.
pub fn convert_with(
    provider: &dyn TransformProvider,
    horizontal: &str,
    vertical: &str,
    options: &ConvertOptions,
    filename: Option<&str>,
) -> Result<FeatureCollection> {
    let feature = convert_feature(provider, horizontal, vertical, options, filename)?;
    Ok(feature_collection(vec![feature]))
}

/// Converts one pair using PROJ for coordinate transforms.
pub fn convert(
    horizontal: &str,
    vertical: &str,
    options: &ConvertOptions,
    filename: Option<&str>,
) -> Result<FeatureCollection> {
    convert_with(&ProjProvider, horizontal, vertical, options, filename)
}

/// Pairs horizontal and vertical files by [`InputFile::stem`], in stem
/// order. A later file with the same stem replaces an earlier one.
pub fn pair_by_stem<'a>(
    horizontal: &'a [InputFile],
    vertical: &'a [InputFile],
) -> Vec<(&'a InputFile, &'a InputFile)> {
    let verticals: BTreeMap<String, &InputFile> =
        vertical.iter().map(|f| (f.stem(), f)).collect();
    let horizontals: BTreeMap<String, &InputFile> =
        horizontal.iter().map(|f| (f.stem(), f)).collect();
    horizontals
        .into_iter()
        .filter_map(|(stem, h)| verticals.get(&stem).map(|v| (h, *v)))
        .collect()
}

/// Converts every matching pair and collects the features. Without any
/// pair the collection is empty and carries [`NO_PAIRS_MESSAGE`].
pub fn convert_batch(
    provider: &dyn TransformProvider,
    horizontal: &[InputFile],
    vertical: &[InputFile],
    options: &ConvertOptions,
) -> Result<FeatureCollection> {
    let pairs = pair_by_stem(horizontal, vertical);
    if pairs.is_empty() {
        warn!(
            "No pairs among {} horizontal and {} vertical files",
            horizontal.len(),
            vertical.len()
        );
        return Ok(empty_collection(NO_PAIRS_MESSAGE));
    }
    let features = pairs
        .into_iter()
        .map(|(h, v)| convert_feature(provider, &h.content, &v.content, options, Some(&h.name)))
        .collect::<Result<Vec<_>>>()?;
    Ok(feature_collection(features))
}
