//! Error types shared by every stage of the engine.

use thiserror::Error;

use crate::matrix::EcLevel;

/// Failures surfaced to the calling handler layer.
///
/// There is no variant for unknown style ids; registries fall back to their default entry.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The payload does not fit any symbol version at the requested level.
    #[error("payload of {payload_len} bytes exceeds QR capacity at error-correction level {level}")]
    EncodingTooLarge { payload_len: usize, level: EcLevel },

    /// The rasterization backend could not be brought up.
    #[error("raster backend unavailable: {0}")]
    RenderBackendUnavailable(String),

    /// The logo could not be fetched or decoded.
    #[error("logo asset could not be loaded: {0}")]
    AssetFetchFailed(String),

    /// Encoding the rasterized image into the requested format failed.
    #[error("image encoding failed: {0}")]
    ImageEncoding(String),

    /// Engine configuration could not be read or parsed.
    #[error("invalid engine configuration: {0}")]
    Config(String),
}

impl From<image::ImageError> for EngineError {
    fn from(err: image::ImageError) -> Self {
        EngineError::ImageEncoding(err.to_string())
    }
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
