//! QR renderer contract and the built-in styled renderer.
//!
//! A [`QrRenderer`] is constructed from a full [`QrOptions`] value, re-renders
//! in place on [`update`](QrRenderer::update), attaches its output to a
//! [`PreviewContainer`], and encodes standalone files on demand without
//! touching the live preview.
//!
//! [`StyledQrRenderer`] is the implementation shipped with this crate. It
//! encodes the matrix with `qrcode`, draws every module as SVG, and
//! rasterises through resvg for PNG and JPEG output.
//!
//! # Example
//!
//! ```
//! use qrify::{DownloadOptions, ExportFormat, PreviewSlot, QrOptions, QrRenderer, StyledQrRenderer};
//!
//! let renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();
//!
//! let mut slot = PreviewSlot::new();
//! renderer.append(&mut slot).unwrap();
//! assert!(slot.current().unwrap().svg.starts_with("<svg"));
//!
//! let png = renderer
//!     .download(&DownloadOptions::square(ExportFormat::Png, 200))
//!     .unwrap();
//! assert_eq!(&png[..4], b"\x89PNG");
//! ```

pub mod logo;
pub mod matrix;
pub mod shapes;
pub mod svg;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use self::logo::{DecodedLogo, is_hidden, place_logo, size_logo};
use self::matrix::{ModuleRole, QrMatrix};
use crate::error::RenderError;
use crate::export::ExportFormat;
use crate::options::{Dimensions, QrOptions};

// ============================================================================
// Contract
// ============================================================================

/// Parameters of a single file export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    pub extension: ExportFormat,
    pub width: u32,
    pub height: u32,
}

impl DownloadOptions {
    pub fn square(extension: ExportFormat, size: u32) -> Self {
        Self {
            extension,
            width: size,
            height: size,
        }
    }
}

/// A rendered preview, ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// A visible container the renderer attaches its output to.
pub trait PreviewContainer {
    /// Replaces whatever the container shows with `preview`.
    fn mount(&mut self, preview: &Preview) -> io::Result<()>;
}

/// The external renderer contract.
pub trait QrRenderer: Sized {
    /// Builds a renderer from the full configuration.
    fn create(options: &QrOptions) -> Result<Self, RenderError>;

    /// Re-renders in place. On error the previous render is kept.
    fn update(&mut self, options: &QrOptions) -> Result<(), RenderError>;

    /// Attaches the current render to a container.
    fn append(&self, container: &mut dyn PreviewContainer) -> Result<(), RenderError>;

    /// Encodes a standalone file at the requested size.
    fn download(&self, options: &DownloadOptions) -> Result<Vec<u8>, RenderError>;
}

// ============================================================================
// Containers
// ============================================================================

/// In-memory container holding the latest preview.
#[derive(Debug, Clone, Default)]
pub struct PreviewSlot {
    current: Option<Preview>,
    mounts: usize,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Preview> {
        self.current.as_ref()
    }

    /// Number of times a preview was mounted.
    pub fn mounts(&self) -> usize {
        self.mounts
    }
}

impl PreviewContainer for PreviewSlot {
    fn mount(&mut self, preview: &Preview) -> io::Result<()> {
        self.current = Some(preview.clone());
        self.mounts += 1;
        Ok(())
    }
}

/// Container that writes each preview to an SVG file.
#[derive(Debug, Clone)]
pub struct SvgFileContainer {
    path: PathBuf,
}

impl SvgFileContainer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreviewContainer for SvgFileContainer {
    fn mount(&mut self, preview: &Preview) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &preview.svg)?;
        debug!(path = %self.path.display(), "Wrote preview");
        Ok(())
    }
}

// ============================================================================
// StyledQrRenderer
// ============================================================================

/// Renderer drawing styled QR codes as SVG.
///
/// The encoded matrix is cached and rebuilt only when the payload or the
/// error correction level changes; the decoded logo is cached until the
/// logo data URL changes.
#[derive(Debug, Clone)]
pub struct StyledQrRenderer {
    options: QrOptions,
    matrix: QrMatrix,
    logo: Option<DecodedLogo>,
    svg: String,
}

impl StyledQrRenderer {
    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    pub fn matrix(&self) -> &QrMatrix {
        &self.matrix
    }

    /// The current preview markup.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Returns true if a logo is being drawn.
    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }
}

fn decode_logo(options: &QrOptions) -> Option<DecodedLogo> {
    options
        .has_logo()
        .then(|| DecodedLogo::decode(&options.image))
        .flatten()
}

impl QrRenderer for StyledQrRenderer {
    fn create(options: &QrOptions) -> Result<Self, RenderError> {
        let matrix = QrMatrix::encode(&options.content, options.qr_options.error_correction_level)?;
        let logo = decode_logo(options);
        let svg = draw_svg(options, &matrix, logo.as_ref())?;
        debug!(modules = matrix.count(), "Created QR renderer");

        Ok(Self {
            options: options.clone(),
            matrix,
            logo,
            svg,
        })
    }

    fn update(&mut self, options: &QrOptions) -> Result<(), RenderError> {
        let level = options.qr_options.error_correction_level;
        let matrix = if self.matrix.matches(&options.content, level) {
            None
        } else {
            Some(QrMatrix::encode(&options.content, level)?)
        };
        let logo = if options.image == self.options.image {
            self.logo.clone()
        } else {
            decode_logo(options)
        };

        let svg = draw_svg(options, matrix.as_ref().unwrap_or(&self.matrix), logo.as_ref())?;

        if let Some(matrix) = matrix {
            debug!(modules = matrix.count(), "Re-encoded QR matrix");
            self.matrix = matrix;
        }
        self.logo = logo;
        self.options = options.clone();
        self.svg = svg;
        Ok(())
    }

    fn append(&self, container: &mut dyn PreviewContainer) -> Result<(), RenderError> {
        let Dimensions { width, height } = self.options.dimensions;
        container.mount(&Preview {
            svg: self.svg.clone(),
            width,
            height,
        })?;
        Ok(())
    }

    fn download(&self, options: &DownloadOptions) -> Result<Vec<u8>, RenderError> {
        let sized = self
            .options
            .with_dimensions(Dimensions::new(options.width, options.height));
        let markup = draw_svg(&sized, &self.matrix, self.logo.as_ref())?;

        match options.extension {
            ExportFormat::Svg => Ok(markup.into_bytes()),
            ExportFormat::Png => {
                svg::encode_png(svg::render_svg(&markup, options.width, options.height)?)
            }
            ExportFormat::Jpeg => {
                let img = svg::render_svg(&markup, options.width, options.height)?;
                svg::encode_jpeg(&img, sized.background_options.color)
            }
        }
    }
}

// ============================================================================
// Drawing
// ============================================================================

/// Draws the complete styled code as an SVG document.
pub fn draw_svg(
    options: &QrOptions,
    matrix: &QrMatrix,
    logo: Option<&DecodedLogo>,
) -> Result<String, RenderError> {
    let Dimensions { width, height } = options.dimensions;
    let count = matrix.count();
    let available = width.min(height).saturating_sub(options.margin.saturating_mul(2));
    let dot = available as usize / count.max(1);
    if dot == 0 {
        return Err(RenderError::TooSmall {
            width,
            height,
            margin: options.margin,
            count,
        });
    }

    let dot = dot as f64;
    let side = count as f64 * dot;
    let x0 = ((f64::from(width) - side) / 2.0).floor();
    let y0 = ((f64::from(height) - side) / 2.0).floor();

    let image_options = &options.image_options;
    let level = options.qr_options.error_correction_level;
    let logo_layout = logo.map(|logo| (logo, size_logo(logo, image_options, level, count, dot)));

    let hidden = |x: usize, y: usize| {
        image_options.hide_background_dots
            && logo_layout.is_some_and(|(_, size)| is_hidden(&size, count, x, y))
    };
    let visible = |x: usize, y: usize| matrix.role(x, y) == ModuleRole::Data && !hidden(x, y);

    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    out.push_str(&format!(
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        options.background_options.color
    ));

    // Data modules
    out.push_str(&format!(r#"<g fill="{}">"#, options.dots_options.color));
    for y in 0..count {
        for x in 0..count {
            if !matrix.is_dark(x as isize, y as isize) || !visible(x, y) {
                continue;
            }
            let neighbors = matrix.neighbors(x, y, &visible);
            out.push_str(&shapes::dot(
                options.dots_options.kind,
                x0 + x as f64 * dot,
                y0 + y as f64 * dot,
                dot,
                neighbors,
            ));
        }
    }
    out.push_str("</g>");

    // Finder patterns
    let origins = matrix.finder_origins();
    out.push_str(&format!(r#"<g fill="{}">"#, options.corners_square_options.color));
    for (ox, oy) in origins {
        out.push_str(&shapes::corner_square(
            options.corners_square_options.kind,
            x0 + ox as f64 * dot,
            y0 + oy as f64 * dot,
            dot,
        ));
    }
    out.push_str("</g>");

    out.push_str(&format!(r#"<g fill="{}">"#, options.corners_dot_options.color));
    for (ox, oy) in origins {
        out.push_str(&shapes::corner_dot(
            options.corners_dot_options.kind,
            x0 + (ox + 2) as f64 * dot,
            y0 + (oy + 2) as f64 * dot,
            dot,
        ));
    }
    out.push_str("</g>");

    let placement = logo_layout.and_then(|(logo, size)| {
        place_logo(&size, (x0, y0), side, image_options.margin).map(|p| (logo, p))
    });
    if let Some((logo, placement)) = placement {
        out.push_str(&format!(
            r#"<image x="{}" y="{}" width="{}" height="{}" xlink:href="{}"/>"#,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            escape_attr(&logo.href)
        ));
    }

    out.push_str("</svg>");
    Ok(out)
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo::DataUrl;
    use crate::options::{CornerDotType, CornerSquareType, DotType, HexColor};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn red_png() -> String {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        DataUrl::new("image/png", bytes).to_string()
    }

    /// Pixel coordinate of the centre of module `(x, y)` for a square render.
    fn module_center(renderer: &StyledQrRenderer, size: u32, x: usize, y: usize) -> (u32, u32) {
        let count = renderer.matrix().count() as u32;
        let dot = (size - 2 * renderer.options().margin) / count;
        let origin = (size - count * dot) / 2;
        (
            origin + x as u32 * dot + dot / 2,
            origin + y as u32 * dot + dot / 2,
        )
    }

    #[test]
    fn preview_uses_configured_dimensions() {
        let renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();
        let mut slot = PreviewSlot::new();

        renderer.append(&mut slot).unwrap();

        let preview = slot.current().unwrap();
        assert_eq!((preview.width, preview.height), (300, 300));
        assert!(preview.svg.contains(r#"width="300""#));
        assert!(preview.svg.contains(r##"fill="#ffffff""##));
        assert_eq!(slot.mounts(), 1);
    }

    #[test]
    fn too_small_canvas_is_rejected() {
        let mut options = QrOptions::default();
        options.dimensions = Dimensions::square(30);

        assert!(matches!(
            StyledQrRenderer::create(&options),
            Err(RenderError::TooSmall { .. })
        ));
    }

    #[test]
    fn png_download_draws_finder_and_margin() {
        let renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();
        let bytes = renderer
            .download(&DownloadOptions::square(ExportFormat::Png, 500))
            .unwrap();

        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (500, 500));
        assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255, 255]);

        let (x, y) = module_center(&renderer, 500, 0, 0);
        assert_eq!(img.get_pixel(x, y).0, [0, 0, 0, 255]);
        let (x, y) = module_center(&renderer, 500, 1, 1);
        assert_eq!(img.get_pixel(x, y).0, [255, 255, 255, 255]);
    }

    #[test]
    fn layer_colors_reach_the_raster() {
        let mut options = QrOptions::default();
        options.corners_square_options.color = HexColor::new(0, 0, 255);
        options.corners_dot_options.color = HexColor::new(0, 255, 0);
        let renderer = StyledQrRenderer::create(&options).unwrap();

        let bytes = renderer
            .download(&DownloadOptions::square(ExportFormat::Png, 400))
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();

        let (x, y) = module_center(&renderer, 400, 0, 3);
        assert_eq!(img.get_pixel(x, y).0, [0, 0, 255, 255]);
        let (x, y) = module_center(&renderer, 400, 3, 3);
        assert_eq!(img.get_pixel(x, y).0, [0, 255, 0, 255]);
    }

    #[test]
    fn download_leaves_preview_untouched() {
        let renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();
        let before = renderer.svg().to_string();

        let svg = renderer
            .download(&DownloadOptions::square(ExportFormat::Svg, 1200))
            .unwrap();

        assert!(String::from_utf8(svg).unwrap().contains(r#"width="1200""#));
        assert_eq!(renderer.svg(), before);
        assert_eq!(renderer.options().dimensions, Dimensions::square(300));
    }

    #[test]
    fn jpeg_download_is_opaque_rgb() {
        let renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();
        let bytes = renderer
            .download(&DownloadOptions::square(ExportFormat::Jpeg, 300))
            .unwrap();

        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.color(), image::ColorType::Rgb8);
        assert_eq!((img.width(), img.height()), (300, 300));
    }

    #[test]
    fn matrix_reencoded_only_for_payload_changes() {
        let mut renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();

        let mut styled = renderer.options().clone();
        styled.dots_options.kind = DotType::Classy;
        styled.corners_square_options.kind = CornerSquareType::ExtraRounded;
        styled.corners_dot_options.kind = CornerDotType::Dot;
        renderer.update(&styled).unwrap();
        let level = styled.qr_options.error_correction_level;
        assert!(renderer.matrix().matches(crate::options::DEFAULT_CONTENT, level));

        let mut changed = styled.clone();
        changed.content = "hello".into();
        renderer.update(&changed).unwrap();
        assert!(renderer.matrix().matches("hello", changed.qr_options.error_correction_level));
        assert_eq!(renderer.matrix().count(), 21);
    }

    #[test]
    fn failed_update_keeps_previous_render() {
        let mut renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();
        let before = renderer.svg().to_string();

        let mut broken = renderer.options().clone();
        broken.content = "x".repeat(5000);
        assert!(renderer.update(&broken).is_err());

        assert_eq!(renderer.svg(), before);
        assert_eq!(renderer.options().content, crate::options::DEFAULT_CONTENT);
    }

    #[test]
    fn every_dot_style_rasterises() {
        for kind in [
            DotType::Square,
            DotType::Dots,
            DotType::Rounded,
            DotType::Classy,
            DotType::ClassyRounded,
            DotType::ExtraRounded,
        ] {
            let mut options = QrOptions::default();
            options.dots_options.kind = kind;
            let renderer = StyledQrRenderer::create(&options).unwrap();
            let bytes = renderer
                .download(&DownloadOptions::square(ExportFormat::Png, 150))
                .unwrap();
            assert_eq!(&bytes[..4], b"\x89PNG", "{kind:?}");
        }
    }

    #[test]
    fn logo_is_drawn_over_cleared_centre() {
        let mut options = QrOptions::default();
        options.image = red_png();
        let renderer = StyledQrRenderer::create(&options).unwrap();
        assert!(renderer.has_logo());
        assert!(renderer.svg().contains("<image"));

        let bytes = renderer
            .download(&DownloadOptions::square(ExportFormat::Png, 300))
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(150, 150).0, [255, 0, 0, 255]);
    }

    #[test]
    fn hidden_dots_are_omitted() {
        let mut shown = QrOptions::default();
        shown.image = red_png();
        shown.image_options.hide_background_dots = false;
        let mut hidden = shown.clone();
        hidden.image_options.hide_background_dots = true;

        let count_rects = |options: &QrOptions| {
            let renderer = StyledQrRenderer::create(options).unwrap();
            renderer.svg().matches("<rect").count()
        };
        assert!(count_rects(&hidden) < count_rects(&shown));
    }

    #[test]
    fn unreadable_logo_is_skipped() {
        let mut options = QrOptions::default();
        options.image = "data:image/png;base64,AAAA".into();

        let renderer = StyledQrRenderer::create(&options).unwrap();
        assert!(!renderer.has_logo());
        assert!(!renderer.svg().contains("<image"));
    }

    #[test]
    fn svg_file_container_writes_markup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preview.svg");
        let mut container = SvgFileContainer::new(&path);

        let renderer = StyledQrRenderer::create(&QrOptions::default()).unwrap();
        renderer.append(&mut container).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, renderer.svg());
    }
}
