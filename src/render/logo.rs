//! Logo decoding, sizing and placement.
//!
//! The logo is scaled so the modules it hides stay within what the error
//! correction level can restore, and the hidden box is always an odd number
//! of modules wide and tall so it centres on the middle module.

use std::io::{self, Cursor};

use image::ImageReader;
use resvg::usvg;
use tracing::warn;

use crate::logo::DataUrl;
use crate::options::{ErrorCorrection, ImageOptions};

/// Modules per axis that must stay visible around the logo (two finders).
const RESERVED_AXIS_MODULES: usize = 14;

// ============================================================================
// Decoded Logo
// ============================================================================

/// A logo data URL together with its intrinsic pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLogo {
    pub href: String,
    pub width: f64,
    pub height: f64,
}

impl DecodedLogo {
    /// Decodes a data URL, logging and returning `None` when it is unusable.
    pub fn decode(href: &str) -> Option<Self> {
        match Self::try_decode(href) {
            Ok(logo) => Some(logo),
            Err(e) => {
                warn!(error = %e, "Dropping unreadable logo");
                None
            }
        }
    }

    fn try_decode(href: &str) -> Result<Self, LogoDecodeError> {
        let url = DataUrl::parse(href).ok_or(LogoDecodeError::NotDataUrl)?;
        let (width, height) = intrinsic_size(&url)?;
        if width <= 0.0 || height <= 0.0 {
            return Err(LogoDecodeError::Empty);
        }
        Ok(Self {
            href: href.to_string(),
            width,
            height,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum LogoDecodeError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("logo has no area")]
    Empty,
    #[error("unreadable SVG logo: {0}")]
    Svg(#[from] usvg::Error),
    #[error("unreadable raster logo: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn intrinsic_size(url: &DataUrl) -> Result<(f64, f64), LogoDecodeError> {
    if url.mime.eq_ignore_ascii_case("image/svg+xml") {
        let tree = usvg::Tree::from_data(&url.bytes, &usvg::Options::default())?;
        let size = tree.size();
        return Ok((f64::from(size.width()), f64::from(size.height())));
    }
    let (width, height) = ImageReader::new(Cursor::new(&url.bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok((f64::from(width), f64::from(height)))
}

// ============================================================================
// Sizing
// ============================================================================

/// Size of the logo box and the modules it hides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogoSize {
    pub width: f64,
    pub height: f64,
    pub hide_x: usize,
    pub hide_y: usize,
}

/// Fits an image of the given aspect ratio into at most `max_hidden` modules,
/// with at most `max_axis` modules along either axis.
pub fn fit_logo(
    original_width: f64,
    original_height: f64,
    max_hidden: usize,
    max_axis: usize,
    dot: f64,
) -> LogoSize {
    if original_width <= 0.0 || original_height <= 0.0 || max_hidden == 0 || dot <= 0.0 {
        return LogoSize::default();
    }

    let k = original_height / original_width;
    let max_hidden = max_hidden as i64;
    let max_axis = max_axis as i64;
    let odd_ceil = |v: f64| 1 + 2 * ((v - 1.0) / 2.0).ceil() as i64;

    let mut hide_x = ((max_hidden as f64 / k).sqrt().floor() as i64).max(1);
    if max_axis > 0 && hide_x > max_axis {
        hide_x = max_axis;
    }
    if hide_x % 2 == 0 {
        hide_x -= 1;
    }
    let mut width = hide_x as f64 * dot;
    let mut hide_y = odd_ceil(hide_x as f64 * k);
    let mut height = (width * k).round();

    let over_axis = max_axis > 0 && hide_y > max_axis;
    if hide_y * hide_x > max_hidden || over_axis {
        if over_axis {
            hide_y = max_axis;
            if hide_y % 2 == 0 {
                hide_y -= 1;
            }
        } else {
            hide_y -= 2;
        }
        height = hide_y as f64 * dot;
        hide_x = odd_ceil(hide_y as f64 / k);
        width = (height / k).round();
    }

    LogoSize {
        width: width.max(0.0),
        height: height.max(0.0),
        hide_x: hide_x.max(0) as usize,
        hide_y: hide_y.max(0) as usize,
    }
}

/// Sizes a logo for a matrix of `count` modules drawn at `dot` pixels each.
pub fn size_logo(
    logo: &DecodedLogo,
    options: &ImageOptions,
    level: ErrorCorrection,
    count: usize,
    dot: f64,
) -> LogoSize {
    let cover = f64::from(options.image_size) * f64::from(level.recovery_fraction());
    let max_hidden = (cover * (count * count) as f64).floor() as usize;
    fit_logo(
        logo.width,
        logo.height,
        max_hidden,
        count.saturating_sub(RESERVED_AXIS_MODULES),
        dot,
    )
}

/// Returns true if the module at `(x, y)` lies under the hidden box.
pub fn is_hidden(size: &LogoSize, count: usize, x: usize, y: usize) -> bool {
    let inside = |i: usize, hide: usize| {
        let i = i as f64;
        let (count, hide) = (count as f64, hide as f64);
        i >= (count - hide) / 2.0 && i < (count + hide) / 2.0
    };
    inside(x, size.hide_x) && inside(y, size.hide_y)
}

/// Pixel rectangle the logo is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Centres the logo box on the matrix and insets it by the logo margin.
///
/// Returns `None` when the margin leaves no area to draw.
pub fn place_logo(
    size: &LogoSize,
    origin: (f64, f64),
    matrix_side: f64,
    margin: u32,
) -> Option<LogoPlacement> {
    let margin = f64::from(margin);
    let placement = LogoPlacement {
        x: origin.0 + margin + (matrix_side - size.width) / 2.0,
        y: origin.1 + margin + (matrix_side - size.height) / 2.0,
        width: size.width - 2.0 * margin,
        height: size.height - 2.0 * margin,
    };
    (placement.width > 0.0 && placement.height > 0.0).then_some(placement)
}
