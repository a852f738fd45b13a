//! File input and output helpers for survey data.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub mod geojson;
pub mod nyl;
pub mod tit;

/// Decodes raw file bytes as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Reads a survey text file, accepting UTF-8 or Latin-1 content.
pub fn read_text<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut buffer = Vec::new();
    File::open(path)?.read_to_end(&mut buffer)?;
    Ok(decode_text(&buffer))
}

/// Writes a string to a file, creating or truncating it.
pub fn write_string<P: AsRef<Path>>(path: P, contents: &str) -> io::Result<()> {
    std::fs::write(path, contents)
}
