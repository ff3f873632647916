//! Error types for surface and configuration operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::Surface`] operations.
///
/// Every failing call leaves the surface exactly as it was before the call.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The file could not be read or is not a supported image.
    #[error("failed to load image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The image decoded but has no usable dimensions.
    #[error("image has unusable dimensions {width}x{height}")]
    ImageBind { width: u32, height: u32 },

    /// Creating or writing the output file failed.
    #[error("failed to write {}: {source}", path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JPEG encoder rejected the bitmap or its sink failed.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("stroke thickness must be positive, got {0}")]
    InvalidThickness(u32),

    #[error("zoom must be a positive finite number, got {0}")]
    InvalidZoom(f32),
}

/// Result type alias for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors raised while loading a [`crate::config::SurfaceConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
