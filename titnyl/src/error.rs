//! Error types for the converter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown CRS {crs}: {reason}")]
    UnknownCrs { crs: String, reason: String },

    #[error("Transform from {crs} failed at ({x}, {y}): {reason}")]
    Transform {
        crs: String,
        x: f64,
        y: f64,
        reason: String,
    },

    #[error("Smoothing failed: {0}")]
    Smoothing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
