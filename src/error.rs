//! Error types for every fallible configurator operation.
//!
//! None of these are fatal: each failure leaves the configuration in its
//! pre-failure state so the caller can retry immediately.

use std::io;

use thiserror::Error;

/// A colour string that is not a valid RGB hex value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid hex color `{input}`")]
pub struct ColorError {
    /// The rejected input.
    pub input: String,
}

/// Errors raised by the logo editor.
#[derive(Debug, Error)]
pub enum LogoError {
    /// The file is neither `image/png` nor `image/svg+xml`.
    #[error("Please upload a PNG or SVG file (got `{0}`)")]
    UnsupportedType(String),

    /// The file contents could not be read.
    #[error("Error processing the file. Please try again. ({0})")]
    Read(#[from] io::Error),
}

/// Errors raised while encoding or drawing a QR code.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The payload does not fit in any QR version.
    #[error("failed to encode QR data: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// The requested canvas leaves less than one pixel per module.
    #[error("{width}x{height} with margin {margin} is too small for a {count}x{count} matrix")]
    TooSmall {
        width: u32,
        height: u32,
        margin: u32,
        count: usize,
    },

    /// The generated SVG could not be parsed for rasterisation.
    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),

    /// A pixmap could not be allocated for the requested size.
    #[error("failed to allocate a {width}x{height} raster")]
    Raster { width: u32, height: u32 },

    /// Raster encoding failed.
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    /// The preview container rejected the rendered output.
    #[error("failed to attach preview: {0}")]
    Mount(#[from] io::Error),
}

/// Errors raised by an export request.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export was requested before the first successful render.
    #[error("QR code not initialized")]
    NotReady,

    /// The last edit could not be rendered, so the preview no longer
    /// matches the configuration.
    #[error("QR code is out of date (configuration revision {pending}, rendered {rendered})")]
    Stale { rendered: u64, pending: u64 },

    /// The renderer failed to produce the file.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The file could not be handed to the save collaborator.
    #[error("failed to save `{file_name}`: {source}")]
    Save {
        file_name: String,
        #[source]
        source: io::Error,
    },
}

/// Errors raised by key-value persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
