//! Error types for rgbmaker.
//!
//! Most failure modes in the compositing core degrade to "skip this visual
//! element"; the variants here are what gets logged or reported when that
//! happens.

use thiserror::Error;

/// The main error type for rgbmaker operations.
#[derive(Error, Debug)]
pub enum RgbError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Bands of one composite do not share a pixel grid
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A scaling law could not be applied to part of a band
    #[error("Scaling error ({law}): {message}")]
    Scaling { law: String, message: String },

    /// A single catalog row could not be turned into an ellipse
    #[error("Catalog geometry error in {catalog} row {row}: {message}")]
    CatalogGeometry {
        catalog: String,
        row: usize,
        message: String,
    },

    /// A whole catalog could not be queried or mapped
    #[error("Catalog error ({catalog}): {message}")]
    Catalog { catalog: String, message: String },

    /// The archive had no image for this survey
    #[error("Band unavailable: {survey}")]
    BandUnavailable { survey: String },

    /// The image archive could not be reached at all
    #[error("Image server unreachable: {message}")]
    ServerDown { message: String },

    /// Raster conversion or encoding errors
    #[error("Image generation error: {message}")]
    ImageGeneration { message: String },
}

/// Convenience type alias for Results with RgbError
pub type Result<T> = std::result::Result<T, RgbError>;
