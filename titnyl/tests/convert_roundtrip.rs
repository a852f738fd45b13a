use std::io::Write;

use geojson::Value;
use titnyl::geometry::Point;
use titnyl::io::tit::format_data_line;
use titnyl::{convert, convert_batch, ConvertOptions, InputFile};

fn horizontal() -> String {
    let start = Point::new(600_000.0, 6_650_000.0);
    let mid = Point::new(600_100.0, 6_650_000.0);
    let end = Point::new(600_200.0, 6_650_000.0);
    format!(
        "10 1 0.000 0 0 0\n{}\n10 2 100.000 0 0 0\n{}\n",
        format_data_line(start, mid, 100.0),
        format_data_line(mid, end, 200.0)
    )
}

const VERTICAL: &str = "0 10\n200 30\n";

fn line(fc: &geojson::FeatureCollection) -> Vec<Vec<f64>> {
    match &fc.features[0].geometry.as_ref().unwrap().value {
        Value::LineString(c) => c.clone(),
        other => panic!("unexpected geometry {:?}", other),
    }
}

#[test]
fn auto_detects_utm32() {
    let fc = convert(&horizontal(), VERTICAL, &ConvertOptions::default(), Some("E6.TIT")).unwrap();
    let props = fc.features[0].properties.as_ref().unwrap();
    assert_eq!(props["epsg"], "25832");
    assert_eq!(props["filename"], "E6.TIT");

    let coords = line(&fc);
    // two segments of 20 steps each, joint point repeated
    assert_eq!(coords.len(), 42);
    assert!((coords[0][0] - 10.8).abs() < 0.1);
    assert!((coords[0][1] - 60.0).abs() < 0.1);
    assert!((coords[0][2] - 10.0).abs() < 1e-9);
    assert!((coords[41][2] - 30.0).abs() < 1e-9);
    assert!(coords[41][0] > coords[0][0]);
}

#[test]
fn smoothed_profile_keeps_ends() {
    let options = ConvertOptions {
        crs: "25832".to_string(),
        smooth_vertical: true,
        ..ConvertOptions::default()
    };
    let fc = convert(&horizontal(), "0 10\n100 12\n200 30\n", &options, None).unwrap();
    let coords = line(&fc);
    assert_eq!(fc.features[0].properties.as_ref().unwrap()["smooth_z"], true);
    assert!((coords[0][2] - 10.0).abs() < 1e-6);
    assert!((coords[coords.len() - 1][2] - 30.0).abs() < 1e-6);
    assert!(coords.iter().all(|c| c[2].is_finite()));
}

#[test]
fn batch_reads_latin1_files() {
    let dir = tempfile::tempdir().unwrap();
    let tit_path = dir.path().join("Vei_Ø.TIT");
    let nyl_path = dir.path().join("vei_ø.nyl");
    let mut tit = Vec::new();
    tit.extend_from_slice(b"Profil \xd8stre\n");
    tit.extend_from_slice(horizontal().as_bytes());
    std::fs::File::create(&tit_path).unwrap().write_all(&tit).unwrap();
    std::fs::write(&nyl_path, VERTICAL).unwrap();

    let horizontal = vec![InputFile::read(&tit_path).unwrap()];
    let vertical = vec![InputFile::read(&nyl_path).unwrap()];
    assert!(horizontal[0].content.starts_with("Profil Østre"));

    let options = ConvertOptions {
        smooth: false,
        ..ConvertOptions::default()
    };
    let fc = convert_batch(&titnyl::crs::ProjProvider, &horizontal, &vertical, &options).unwrap();
    assert_eq!(fc.features.len(), 1);
    assert_eq!(line(&fc).len(), 3);
}
