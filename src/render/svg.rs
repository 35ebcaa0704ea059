//! SVG rasterisation using resvg/usvg, and raster encoding.
//!
//! The styled code is always built as SVG first. PNG and JPEG exports parse
//! that markup back with usvg and draw it onto a tiny_skia pixmap.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::RenderError;
use crate::options::HexColor;

// ============================================================================
// SVG Rendering
// ============================================================================

/// Renders SVG markup to an RGBA image of exactly `width x height` pixels.
///
/// The document is stretched to the target size, so markup whose own size
/// already matches is drawn 1:1.
pub fn render_svg(svg_data: &str, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts)?;

    let svg_size = tree.size();
    let scale_x = width as f32 / svg_size.width();
    let scale_y = height as f32 / svg_size.height();

    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Raster { width, height })?;
    let transform = Transform::from_scale(scale_x, scale_y);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap (premultiplied) to a straight-alpha RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let pixels = pixmap.pixels();
    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let color = pixels[(y * width + x) as usize].demultiply();
        Rgba([color.red(), color.green(), color.blue(), color.alpha()])
    })
}

// ============================================================================
// Flattening
// ============================================================================

/// Flattens an image onto an opaque background color.
pub fn flatten(src: &RgbaImage, background: HexColor) -> RgbaImage {
    let (r, g, b, a) = background.to_rgba();
    let mut dest = RgbaImage::from_pixel(src.width(), src.height(), Rgba([r, g, b, a]));
    imageops::overlay(&mut dest, src, 0, 0);
    dest
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes an RGBA image as PNG.
pub fn encode_png(img: RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Flattens onto `background` and encodes as RGB JPEG.
pub fn encode_jpeg(img: &RgbaImage, background: HexColor) -> Result<Vec<u8>, RenderError> {
    let rgb = DynamicImage::ImageRgba8(flatten(img, background)).to_rgb8();
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(rgb).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><circle cx="50" cy="50" r="40" fill="#ff0000"/></svg>"##;

    #[test]
    fn render_scales_to_target() {
        let img = render_svg(SIMPLE_SVG, 50, 50).unwrap();
        assert_eq!(img.dimensions(), (50, 50));

        let center = img.get_pixel(25, 25);
        assert_eq!(center.0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn invalid_svg_is_an_error() {
        assert!(matches!(render_svg("<nope", 10, 10), Err(RenderError::Svg(_))));
    }

    #[test]
    fn zero_size_raster_is_an_error() {
        assert!(matches!(
            render_svg(SIMPLE_SVG, 0, 10),
            Err(RenderError::Raster { .. })
        ));
    }

    #[test]
    fn flatten_fills_transparency_with_background() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let flat = flatten(&src, HexColor::new(10, 20, 30));

        assert_eq!(flat.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn flatten_keeps_opaque_pixels() {
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([0, 0, 255, 255]));
        let flat = flatten(&src, HexColor::WHITE);

        assert_eq!(flat.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn encoders_emit_magic_bytes() {
        let img = render_svg(SIMPLE_SVG, 20, 20).unwrap();

        let png = encode_png(img.clone()).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");

        let jpeg = encode_jpeg(&img, HexColor::WHITE).unwrap();
        assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
    }
}
