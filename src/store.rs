//! The single owned configuration and its edit vocabulary.
//!
//! Editors never mutate the configuration directly. They read the current
//! [`QrOptions`] and describe their edit as an [`Update`]; the application
//! root hands that to [`ConfigStore::apply`], which builds the next value and
//! replaces the old one wholesale.
//!
//! The store keeps a revision number that increments on every effective
//! change, so downstream consumers (the preview bridge) can tell whether
//! their last render is stale.

use crate::options::{
    BackgroundOptions, CornerDotType, CornerSquareType, Dimensions, DotType, ErrorCorrection,
    HexColor, LayerOptions, QrOptions, clamp_image_margin, clamp_image_size, clamp_margin,
};

// ============================================================================
// Update
// ============================================================================

/// A partial edit of one layer: only the fields that are `Some` change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPatch<T> {
    pub color: Option<HexColor>,
    pub kind: Option<T>,
}

impl<T> LayerPatch<T> {
    pub fn color(color: HexColor) -> Self {
        Self {
            color: Some(color),
            kind: None,
        }
    }

    pub fn kind(kind: T) -> Self {
        Self {
            color: None,
            kind: Some(kind),
        }
    }

    fn merge_into(self, layer: &mut LayerOptions<T>) {
        if let Some(color) = self.color {
            layer.color = color;
        }
        if let Some(kind) = self.kind {
            layer.kind = kind;
        }
    }
}

/// A partial edit of the logo options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageOptionsPatch {
    pub image_size: Option<f32>,
    pub margin: Option<u32>,
    pub hide_background_dots: Option<bool>,
}

/// One shallow-merge edit of the configuration.
///
/// Each variant replaces exactly one field or sub-object; sibling fields are
/// carried over from the current value.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Content(String),
    Dimensions(Dimensions),
    Margin(u32),
    Dots(LayerPatch<DotType>),
    CornersSquare(LayerPatch<CornerSquareType>),
    CornersDot(LayerPatch<CornerDotType>),
    Background(HexColor),
    /// Logo data URL; an empty string removes the logo.
    Image(String),
    ImageOptions(ImageOptionsPatch),
    ErrorCorrection(ErrorCorrection),
}

impl Update {
    /// Produces the next configuration from `current` with this edit applied.
    pub fn apply_to(self, current: &QrOptions) -> QrOptions {
        let mut next = current.clone();
        match self {
            Update::Content(content) => next.content = content,
            Update::Dimensions(dimensions) => next.dimensions = dimensions,
            Update::Margin(margin) => next.margin = clamp_margin(margin),
            Update::Dots(patch) => patch.merge_into(&mut next.dots_options),
            Update::CornersSquare(patch) => patch.merge_into(&mut next.corners_square_options),
            Update::CornersDot(patch) => patch.merge_into(&mut next.corners_dot_options),
            Update::Background(color) => next.background_options = BackgroundOptions { color },
            Update::Image(image) => next.image = image,
            Update::ImageOptions(patch) => {
                let image_options = &mut next.image_options;
                if let Some(size) = patch.image_size {
                    image_options.image_size = clamp_image_size(size);
                }
                if let Some(margin) = patch.margin {
                    image_options.margin = clamp_image_margin(margin);
                }
                if let Some(hide) = patch.hide_background_dots {
                    image_options.hide_background_dots = hide;
                }
            }
            Update::ErrorCorrection(level) => next.qr_options.error_correction_level = level,
        }
        next
    }
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Owner of the current configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    options: QrOptions,
    revision: u64,
}

impl ConfigStore {
    pub fn new(options: QrOptions) -> Self {
        Self {
            options: options.normalized(),
            revision: 0,
        }
    }

    /// Returns the current configuration.
    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    /// Returns the current revision number.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the whole configuration. Returns true if it changed.
    pub fn replace(&mut self, options: QrOptions) -> bool {
        let options = options.normalized();
        if options == self.options {
            return false;
        }
        self.options = options;
        self.revision = self.revision.wrapping_add(1);
        true
    }

    /// Applies one edit. Returns true if the configuration changed.
    pub fn apply(&mut self, update: Update) -> bool {
        let next = update.apply_to(&self.options);
        self.replace(next)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_bumps_revision_only_on_change() {
        let mut store = ConfigStore::default();
        assert_eq!(store.revision(), 0);

        assert!(store.apply(Update::Margin(20)));
        assert_eq!(store.revision(), 1);

        // Same value again is a no-op
        assert!(!store.apply(Update::Margin(20)));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn layer_patch_leaves_sibling_layers_untouched() {
        let mut store = ConfigStore::default();
        let red = HexColor::new(255, 0, 0);
        store.apply(Update::Dots(LayerPatch::color(red)));
        store.apply(Update::CornersSquare(LayerPatch::kind(CornerSquareType::Dot)));

        store.apply(Update::CornersDot(LayerPatch::kind(CornerDotType::Dot)));

        let options = store.options();
        assert_eq!(options.corners_dot_options.kind, CornerDotType::Dot);
        assert_eq!(options.corners_dot_options.color, HexColor::BLACK);
        assert_eq!(options.dots_options.color, red);
        assert_eq!(options.dots_options.kind, DotType::Square);
        assert_eq!(options.corners_square_options.kind, CornerSquareType::Dot);
        assert_eq!(options.corners_square_options.color, HexColor::BLACK);
    }

    #[test]
    fn layer_patch_color_keeps_shape() {
        let mut store = ConfigStore::default();
        store.apply(Update::Dots(LayerPatch::kind(DotType::Classy)));
        store.apply(Update::Dots(LayerPatch::color(HexColor::new(0, 0, 255))));

        assert_eq!(store.options().dots_options.kind, DotType::Classy);
        assert_eq!(store.options().dots_options.color.to_string(), "#0000ff");
    }

    #[test]
    fn margin_is_clamped() {
        let mut store = ConfigStore::default();
        store.apply(Update::Margin(75));
        assert_eq!(store.options().margin, 50);
    }

    #[test]
    fn image_options_patch_clamps_and_merges() {
        let mut store = ConfigStore::default();
        store.apply(Update::ImageOptions(ImageOptionsPatch {
            image_size: Some(0.01),
            ..Default::default()
        }));
        store.apply(Update::ImageOptions(ImageOptionsPatch {
            margin: Some(30),
            ..Default::default()
        }));

        let image_options = store.options().image_options;
        assert_eq!(image_options.image_size, 0.05);
        assert_eq!(image_options.margin, 10);
        assert!(image_options.hide_background_dots);
    }

    #[test]
    fn replace_normalizes_and_tracks_revision() {
        let mut store = ConfigStore::default();
        let mut options = QrOptions::default();
        options.margin = 999;

        assert!(store.replace(options));
        assert_eq!(store.options().margin, 50);
        assert_eq!(store.revision(), 1);

        // Replacing with an equal value changes nothing
        assert!(!store.replace(store.options().clone()));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn apply_to_does_not_mutate_current() {
        let current = QrOptions::default();
        let next = Update::Content("hello".into()).apply_to(&current);

        assert_eq!(next.content, "hello");
        assert_eq!(current.content, crate::options::DEFAULT_CONTENT);
    }
}
