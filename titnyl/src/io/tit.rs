//! Reader for TIT horizontal geometry files.
//!
//! A TIT record spans two physical lines that both start with the record
//! marker `10`:
//!
//! ```text
//! 10 <seq> <start station> <start radius> <end radius> <A>
//! 10<start N><start E><end N><end E><end station>
//! ```
//!
//! The header is whitespace separated. The data line is fixed width: five
//! numeric fields of eleven characters each, starting right after the marker.
//! Parsing is best effort. Malformed records are skipped and the reader moves
//! on to the next candidate line.

use log::debug;

use crate::alignment::GeometrySegment;
use crate::geometry::Point;

/// Marker that opens both lines of a record.
pub const RECORD_MARKER: &str = "10";

/// Minimum number of whitespace separated tokens on a header line.
pub const HEADER_FIELD_COUNT: usize = 6;

/// A numeric field at a fixed byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedField {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FixedField {
    const fn new(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            offset,
            width: DATA_FIELD_WIDTH,
        }
    }

    /// Reads this field from `line`.
    ///
    /// A line that ends inside the field yields whatever part of the field is
    /// present. A line that ends before the field starts, or a value that is
    /// not a finite number, yields `None`.
    pub fn read(&self, line: &str) -> Option<f64> {
        if self.offset >= line.len() {
            return None;
        }
        let end = (self.offset + self.width).min(line.len());
        parse_finite(line.get(self.offset..end)?.trim())
    }
}

/// Width of every numeric field on a data line.
pub const DATA_FIELD_WIDTH: usize = 11;

/// Layout of a data line.
pub const DATA_FIELDS: [FixedField; 5] = [
    FixedField::new("start_northing", 2),
    FixedField::new("start_easting", 13),
    FixedField::new("end_northing", 24),
    FixedField::new("end_easting", 35),
    FixedField::new("end_station", 46),
];

/// `str::parse` accepts `nan` and `inf`; stations and coordinates must not.
fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads every field of `fields` from `line`. On failure returns the name of
/// the first unreadable field.
pub fn read_fixed_fields<const N: usize>(
    line: &str,
    fields: &[FixedField; N],
) -> Result<[f64; N], &'static str> {
    let mut values = [0.0; N];
    for (value, field) in values.iter_mut().zip(fields) {
        *value = field.read(line).ok_or(field.name)?;
    }
    Ok(values)
}

struct Header {
    sequence: f64,
    start_station: f64,
    start_radius: f64,
    end_radius: f64,
    shape_parameter: f64,
}

fn parse_header(line: &str) -> Option<Header> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < HEADER_FIELD_COUNT || parts[0] != RECORD_MARKER {
        return None;
    }
    let num = |i: usize| parse_finite(parts[i]);
    Some(Header {
        sequence: num(1)?,
        start_station: num(2)?,
        start_radius: num(3)?,
        end_radius: num(4)?,
        shape_parameter: num(5)?,
    })
}

/// Parses TIT content into geometry segments in file order.
pub fn parse_tit(content: &str) -> Vec<GeometrySegment> {
    let lines: Vec<&str> = content.lines().collect();
    let mut segments = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }
        let Some(header) = parse_header(line) else {
            debug!("TIT line {}: not a record header, skipped", i + 1);
            i += 1;
            continue;
        };
        let Some(data_line) = lines.get(i + 1).map(|l| l.trim()) else {
            debug!("TIT line {}: header without data line", i + 1);
            break;
        };
        if !data_line.starts_with(RECORD_MARKER) {
            debug!("TIT line {}: data line lacks record marker", i + 2);
            i += 1;
            continue;
        }
        let [start_n, start_e, end_n, end_e, end_station] =
            match read_fixed_fields(data_line, &DATA_FIELDS) {
                Ok(values) => values,
                Err(field) => {
                    debug!("TIT line {}: unreadable {}", i + 2, field);
                    i += 1;
                    continue;
                }
            };
        segments.push(GeometrySegment::new(
            header.sequence,
            header.start_station,
            end_station,
            header.start_radius,
            header.end_radius,
            header.shape_parameter,
            Point::from_northing_easting(start_n, start_e),
            Point::from_northing_easting(end_n, end_e),
        ));
        i += 2;
    }
    debug!("TIT: parsed {} segments from {} lines", segments.len(), lines.len());
    segments
}

/// Formats a data line in the fixed-width layout read by [`parse_tit`].
pub fn format_data_line(start: Point, end: Point, end_station: f64) -> String {
    format!(
        "{}{:>11.3}{:>11.3}{:>11.3}{:>11.3}{:>11.3}",
        RECORD_MARKER,
        start.northing(),
        start.easting(),
        end.northing(),
        end.easting(),
        end_station
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        start_station: f64,
        r1: f64,
        r2: f64,
        start: Point,
        end: Point,
        end_station: f64,
    ) -> String {
        format!(
            "10 1 {:.3} {} {} 0\n{}\n",
            start_station,
            r1,
            r2,
            format_data_line(start, end, end_station)
        )
    }

    #[test]
    fn parses_straight_record() {
        let start = Point::new(1000.0, 1000.0);
        let text = record(0.0, 0.0, 0.0, start, Point::new(1100.0, 1000.0), 100.0);
        let segs = parse_tit(&text);
        assert_eq!(segs.len(), 1);
        let s = &segs[0];
        assert_eq!(s.start_station, 0.0);
        assert_eq!(s.end_station, 100.0);
        assert!(s.start_radius.is_infinite());
        assert!(s.end_radius.is_infinite());
        assert_eq!(s.start, Point::new(1000.0, 1000.0));
        assert_eq!(s.end, Point::new(1100.0, 1000.0));
    }

    #[test]
    fn data_line_fields_are_northing_first() {
        let line = concat!(
            "10",
            "6650000.000",
            " 600000.000",
            "6650100.000",
            " 600050.000",
            "    123.456"
        );
        let [sn, se, en, ee, st] = read_fixed_fields(line, &DATA_FIELDS).unwrap();
        assert_eq!(
            (sn, se, en, ee, st),
            (6_650_000.0, 600_000.0, 6_650_100.0, 600_050.0, 123.456)
        );
    }

    #[test]
    fn skips_garbage_and_keeps_going() {
        let good = record(0.0, 500.0, -300.0, Point::new(0.0, 0.0), Point::new(50.0, 1.0), 50.0);
        let text = format!("junk line\n10 1 a b c d\n10 x\n\n{}20 1 2 3 4 5\n", good);
        let segs = parse_tit(&text);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].start_radius, 500.0);
        assert_eq!(segs[0].end_radius, -300.0);
    }

    #[test]
    fn bad_data_line_is_retried_as_header() {
        let good = record(10.0, 0.0, 0.0, Point::new(0.0, 0.0), Point::new(10.0, 0.0), 20.0);
        let text = format!("10 1 0 0 0 0\n10 not numbers at all here\n{}", good);
        let segs = parse_tit(&text);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].start_station, 10.0);
    }

    #[test]
    fn trailing_header_stops_parsing() {
        let good = record(0.0, 0.0, 0.0, Point::new(0.0, 0.0), Point::new(10.0, 0.0), 10.0);
        let text = format!("{}10 2 10 0 0 0", good);
        assert_eq!(parse_tit(&text).len(), 1);
    }

    #[test]
    fn truncated_data_line_is_skipped() {
        let full = format_data_line(
            Point::new(600_000.0, 6_650_000.0),
            Point::new(600_050.0, 6_650_100.0),
            100.0,
        );
        let text = format!("10 1 0 0 0 0\n{}\n", &full[..30]);
        assert!(parse_tit(&text).is_empty());
        assert_eq!(read_fixed_fields(&full[..30], &DATA_FIELDS), Err("end_easting"));
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let good = record(0.0, 0.0, 0.0, Point::new(0.0, 0.0), Point::new(10.0, 0.0), 10.0);
        let data = format_data_line(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 10.0);
        let inf_station = format!("{}{:>11}", &data[..46], "inf");
        let text = format!(
            "10 1 nan 0 0 0\n{}\n10 2 0 0 0 0\n{}\n10 3 0 inf 0 0\n{}\n{}",
            data, inf_station, data, good
        );
        let segs = parse_tit(&text);
        assert_eq!(segs.len(), 1);
        assert!(segs.iter().all(|s| s.start_station.is_finite() && s.end_station.is_finite()));
        assert_eq!(FixedField::new("x", 0).read("NaN"), None);
    }
}
