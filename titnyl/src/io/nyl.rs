//! Reader for NYL vertical profile files.
//!
//! Each line holds `station height` separated by whitespace; further tokens
//! are ignored. Lines that do not start with two numbers are skipped.

use log::debug;

use crate::profile::VerticalSample;

/// Parses NYL text into samples sorted by station.
///
/// The sort is stable, so samples sharing a station keep their file order.
pub fn parse_nyl(content: &str) -> Vec<VerticalSample> {
    let mut samples: Vec<VerticalSample> = content
        .lines()
        .enumerate()
        .filter_map(|(no, line)| {
            let sample = parse_line(line);
            if sample.is_none() && !line.trim().is_empty() {
                debug!("Skipping NYL line {}: {:?}", no + 1, line);
            }
            sample
        })
        .collect();
    samples.sort_by(|a, b| a.station.total_cmp(&b.station));
    debug!("Read {} vertical samples", samples.len());
    samples
}

fn parse_line(line: &str) -> Option<VerticalSample> {
    let mut tokens = line.split_whitespace();
    let station: f64 = tokens.next()?.parse().ok()?;
    let height: f64 = tokens.next()?.parse().ok()?;
    if station.is_finite() && height.is_finite() {
        Some(VerticalSample::new(station, height))
    } else {
        None
    }
}
