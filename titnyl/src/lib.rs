//! Core library for converting TIT/NYL road alignments to GeoJSON.

pub mod alignment;
pub mod config;
pub mod convert;
pub mod crs;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod io;
pub mod profile;
pub mod reproject;

pub use config::ConvertOptions;
pub use convert::{convert, convert_batch, convert_with, InputFile};
pub use error::{Error, Result};
