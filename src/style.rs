//! Style editor: shape and color of the three stylable layers.
//!
//! Every operation reads nothing but its arguments and returns an
//! [`Update`] that touches a single layer (or the background, or the
//! margin), so sibling layers keep their stored values.

use crate::options::{
    CornerDotType, CornerSquareType, DotType, HexColor, MARGIN_RANGE, QrOptions, clamp_margin,
};
use crate::store::{LayerPatch, Update};

/// The three independently styled layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleLayer {
    Dots,
    CornersSquare,
    CornersDot,
}

impl StyleLayer {
    pub const ALL: [Self; 3] = [Self::Dots, Self::CornersSquare, Self::CornersDot];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dots => "Dots",
            Self::CornersSquare => "Corner Square",
            Self::CornersDot => "Corner Dot",
        }
    }

    /// Shape names offered for this layer, in display order.
    pub fn variants(self) -> Vec<&'static str> {
        match self {
            Self::Dots => DotType::SELECTABLE.iter().map(|t| t.as_str()).collect(),
            Self::CornersSquare => CornerSquareType::SELECTABLE
                .iter()
                .map(|t| t.as_str())
                .collect(),
            Self::CornersDot => CornerDotType::SELECTABLE
                .iter()
                .map(|t| t.as_str())
                .collect(),
        }
    }

    /// Current color of this layer.
    pub fn color(self, options: &QrOptions) -> HexColor {
        match self {
            Self::Dots => options.dots_options.color,
            Self::CornersSquare => options.corners_square_options.color,
            Self::CornersDot => options.corners_dot_options.color,
        }
    }
}

/// Capitalizes a shape name for display (`classy-rounded` -> `Classy-rounded`).
pub fn variant_label(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Stateless style editing operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleEditor;

impl StyleEditor {
    pub fn select_dot_type(kind: DotType) -> Update {
        Update::Dots(LayerPatch::kind(kind))
    }

    pub fn select_corner_square_type(kind: CornerSquareType) -> Update {
        Update::CornersSquare(LayerPatch::kind(kind))
    }

    pub fn select_corner_dot_type(kind: CornerDotType) -> Update {
        Update::CornersDot(LayerPatch::kind(kind))
    }

    pub fn set_color(layer: StyleLayer, color: HexColor) -> Update {
        match layer {
            StyleLayer::Dots => Update::Dots(LayerPatch::color(color)),
            StyleLayer::CornersSquare => Update::CornersSquare(LayerPatch::color(color)),
            StyleLayer::CornersDot => Update::CornersDot(LayerPatch::color(color)),
        }
    }

    pub fn set_background(color: HexColor) -> Update {
        Update::Background(color)
    }

    /// Sets the shared outer margin, clamped to the slider range.
    pub fn set_margin(margin: u32) -> Update {
        Update::Margin(clamp_margin(margin))
    }

    pub fn margin_range() -> std::ops::RangeInclusive<u32> {
        MARGIN_RANGE
    }
}
