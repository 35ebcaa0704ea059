//! Serializable QR configuration.
//!
//! A [`QrOptions`] value holds every rendering option: the payload, the
//! preview dimensions, the outer margin, per-layer shape and color, the
//! background, and the optional logo. Field names follow the styling
//! library's option format so a configuration can be exported as JSON and
//! re-imported unchanged.
//!
//! # Example
//!
//! ```
//! use qrify::{DotType, QrOptions};
//!
//! let mut options = QrOptions::default();
//! options.dots_options.kind = DotType::Rounded;
//!
//! let json = options.to_json().unwrap();
//! let restored = QrOptions::from_json(&json).unwrap();
//! assert_eq!(restored.dots_options.kind, DotType::Rounded);
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Payload shown when the application starts.
pub const DEFAULT_CONTENT: &str = "https://github.com/buggy-bits/qrify";

/// Range of the outer margin slider, in pixels.
pub const MARGIN_RANGE: RangeInclusive<u32> = 0..=50;

/// Range of the logo margin slider, in pixels.
pub const IMAGE_MARGIN_RANGE: RangeInclusive<u32> = 0..=10;

/// Range of the logo size slider, as a fraction of the code.
pub const IMAGE_SIZE_RANGE: RangeInclusive<f32> = 0.05..=0.5;

// ============================================================================
// HexColor
// ============================================================================

/// An opaque sRGB color that always serializes as lowercase `#rrggbb`.
///
/// Parsing accepts `#rrggbb`, `rrggbb` and the `#rgb` shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(Srgb<u8>);

impl HexColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        Srgb::<u8>::from_str(trimmed)
            .map(Self)
            .map_err(|_| ColorError {
                input: input.to_string(),
            })
    }

    /// Returns the color as an `(r, g, b, a)` tuple with full alpha.
    pub fn to_rgba(self) -> (u8, u8, u8, u8) {
        (self.0.red, self.0.green, self.0.blue, 255)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for HexColor {
    fn schema_name() -> String {
        "HexColor".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

// ============================================================================
// Shape Variants
// ============================================================================

/// Shape of the data modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DotType {
    #[default]
    Square,
    Dots,
    Rounded,
    Classy,
    ClassyRounded,
    ExtraRounded,
}

impl DotType {
    /// The variants offered by the style editor.
    pub const SELECTABLE: [Self; 5] = [
        Self::Square,
        Self::Dots,
        Self::Rounded,
        Self::Classy,
        Self::ClassyRounded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Dots => "dots",
            Self::Rounded => "rounded",
            Self::Classy => "classy",
            Self::ClassyRounded => "classy-rounded",
            Self::ExtraRounded => "extra-rounded",
        }
    }
}

/// Shape of the 7x7 ring of each finder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CornerSquareType {
    #[default]
    Square,
    Dot,
    ExtraRounded,
}

impl CornerSquareType {
    pub const SELECTABLE: [Self; 3] = [Self::Square, Self::Dot, Self::ExtraRounded];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Dot => "dot",
            Self::ExtraRounded => "extra-rounded",
        }
    }
}

/// Shape of the 3x3 center of each finder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CornerDotType {
    #[default]
    Square,
    Dot,
}

impl CornerDotType {
    pub const SELECTABLE: [Self; 2] = [Self::Square, Self::Dot];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Dot => "dot",
        }
    }
}

/// Error correction level used when encoding the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ErrorCorrection {
    L,
    M,
    #[default]
    Q,
    H,
}

impl ErrorCorrection {
    /// Fraction of codewords that can be restored at this level.
    ///
    /// Bounds how much of the code a logo may cover.
    pub fn recovery_fraction(self) -> f32 {
        match self {
            Self::L => 0.07,
            Self::M => 0.15,
            Self::Q => 0.25,
            Self::H => 0.30,
        }
    }
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

// ============================================================================
// Option Groups
// ============================================================================

/// Color and shape of one stylable layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "jsonschema", schemars(bound = "T: schemars::JsonSchema + Default"))]
pub struct LayerOptions<T> {
    pub color: HexColor,

    #[serde(rename = "type", default)]
    pub kind: T,
}

impl<T: Default> Default for LayerOptions<T> {
    fn default() -> Self {
        Self {
            color: HexColor::BLACK,
            kind: T::default(),
        }
    }
}

pub type DotsOptions = LayerOptions<DotType>;
pub type CornersSquareOptions = LayerOptions<CornerSquareType>;
pub type CornersDotOptions = LayerOptions<CornerDotType>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct BackgroundOptions {
    pub color: HexColor,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            color: HexColor::WHITE,
        }
    }
}

/// Logo sizing and placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ImageOptions {
    /// Logo size as a fraction of the code (0.05-0.5).
    pub image_size: f32,

    /// Gap between the logo and the surrounding dots, in pixels (0-10).
    pub margin: u32,

    /// Whether dots underneath the logo are omitted.
    pub hide_background_dots: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            image_size: 0.3,
            margin: 0,
            hide_background_dots: true,
        }
    }
}

impl ImageOptions {
    /// Returns a copy with every field clamped to its slider range.
    pub fn normalized(self) -> Self {
        Self {
            image_size: clamp_image_size(self.image_size),
            margin: clamp_image_margin(self.margin),
            hide_background_dots: self.hide_background_dots,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct QrSettings {
    #[serde(default)]
    pub error_correction_level: ErrorCorrection,
}

/// Pixel size of the live preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::square(300)
    }
}

// ============================================================================
// QrOptions
// ============================================================================

/// The complete rendering configuration.
///
/// # JSON Format
///
/// ```json
/// {
///   "width": 300,
///   "height": 300,
///   "data": "https://github.com/buggy-bits/qrify",
///   "image": "",
///   "margin": 10,
///   "qrOptions": { "errorCorrectionLevel": "Q" },
///   "dotsOptions": { "color": "#000000", "type": "square" },
///   "cornersSquareOptions": { "color": "#000000", "type": "square" },
///   "cornersDotOptions": { "color": "#000000", "type": "square" },
///   "backgroundOptions": { "color": "#ffffff" },
///   "imageOptions": { "imageSize": 0.3, "margin": 0, "hideBackgroundDots": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct QrOptions {
    #[serde(flatten)]
    pub dimensions: Dimensions,

    /// Payload encoded into the matrix.
    #[serde(rename = "data")]
    pub content: String,

    /// Logo as a data URL. Empty means no logo.
    pub image: String,

    /// Outer padding in pixels.
    pub margin: u32,

    pub qr_options: QrSettings,
    pub dots_options: DotsOptions,
    pub corners_square_options: CornersSquareOptions,
    pub corners_dot_options: CornersDotOptions,
    pub background_options: BackgroundOptions,
    pub image_options: ImageOptions,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            content: DEFAULT_CONTENT.to_string(),
            image: String::new(),
            margin: 10,
            qr_options: QrSettings::default(),
            dots_options: DotsOptions::default(),
            corners_square_options: CornersSquareOptions::default(),
            corners_dot_options: CornersDotOptions::default(),
            background_options: BackgroundOptions::default(),
            image_options: ImageOptions::default(),
        }
    }
}

impl QrOptions {
    /// Returns true if a logo is set.
    pub fn has_logo(&self) -> bool {
        !self.image.is_empty()
    }

    /// Returns a copy with every numeric field clamped to its slider range.
    pub fn normalized(mut self) -> Self {
        self.margin = clamp_margin(self.margin);
        self.image_options = self.image_options.normalized();
        self
    }

    /// Returns a copy rendered at a different pixel size.
    ///
    /// Used for exports, which must not touch the preview dimensions.
    pub fn with_dimensions(&self, dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            ..self.clone()
        }
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the configuration to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a configuration from a JSON string.
    ///
    /// Missing fields take their defaults and out-of-range values are clamped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }
}

pub fn clamp_margin(margin: u32) -> u32 {
    margin.clamp(*MARGIN_RANGE.start(), *MARGIN_RANGE.end())
}

pub fn clamp_image_margin(margin: u32) -> u32 {
    margin.clamp(*IMAGE_MARGIN_RANGE.start(), *IMAGE_MARGIN_RANGE.end())
}

pub fn clamp_image_size(size: f32) -> f32 {
    if size.is_nan() {
        return ImageOptions::default().image_size;
    }
    size.clamp(*IMAGE_SIZE_RANGE.start(), *IMAGE_SIZE_RANGE.end())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_configuration() {
        let options = QrOptions::default();

        assert_eq!(options.content, DEFAULT_CONTENT);
        assert_eq!(options.margin, 10);
        assert_eq!(options.dimensions, Dimensions::square(300));
        assert_eq!(options.dots_options.color.to_string(), "#000000");
        assert_eq!(options.corners_square_options.color.to_string(), "#000000");
        assert_eq!(options.corners_dot_options.color.to_string(), "#000000");
        assert_eq!(options.background_options.color.to_string(), "#ffffff");
        assert_eq!(options.image, "");
        assert!(!options.has_logo());
        assert_eq!(options.image_options.image_size, 0.3);
        assert!(options.image_options.hide_background_dots);
    }

    #[test]
    fn json_uses_styling_library_field_names() {
        let json = QrOptions::default().to_json_pretty().unwrap();

        assert!(json.contains("\"width\": 300"));
        assert!(json.contains("\"data\""));
        assert!(json.contains("\"dotsOptions\""));
        assert!(json.contains("\"cornersSquareOptions\""));
        assert!(json.contains("\"cornersDotOptions\""));
        assert!(json.contains("\"hideBackgroundDots\""));
        assert!(json.contains("\"type\": \"square\""));
        assert!(!json.contains("\"dimensions\""));
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let options = QrOptions::from_json("{}").unwrap();
        assert_eq!(options, QrOptions::default());
    }

    #[test]
    fn kebab_case_shapes_parse() {
        let json = r##"{"dotsOptions":{"color":"#ff0000","type":"classy-rounded"},
                       "cornersSquareOptions":{"color":"#00f","type":"extra-rounded"}}"##;
        let options = QrOptions::from_json(json).unwrap();

        assert_eq!(options.dots_options.kind, DotType::ClassyRounded);
        assert_eq!(options.dots_options.color, HexColor::new(255, 0, 0));
        assert_eq!(
            options.corners_square_options.kind,
            CornerSquareType::ExtraRounded
        );
        assert_eq!(options.corners_square_options.color.to_string(), "#0000ff");
    }

    #[test]
    fn imported_values_are_clamped() {
        let json = r#"{"margin": 400, "imageOptions": {"imageSize": 0.9, "margin": 99}}"#;
        let options = QrOptions::from_json(json).unwrap();

        assert_eq!(options.margin, 50);
        assert_eq!(options.image_options.image_size, 0.5);
        assert_eq!(options.image_options.margin, 10);
    }

    #[test]
    fn invalid_color_is_rejected() {
        assert!(HexColor::parse("not-a-color").is_err());
        let json = r##"{"backgroundOptions":{"color":"#zzzzzz"}}"##;
        assert!(QrOptions::from_json(json).is_err());
    }

    #[test]
    fn hex_color_normalizes_to_lowercase() {
        let color = HexColor::parse("#AbCdEf").unwrap();
        assert_eq!(color.to_string(), "#abcdef");
        assert_eq!(HexColor::parse("abcdef").unwrap(), color);
    }

    #[test]
    fn image_size_clamp_bounds() {
        assert_eq!(clamp_image_size(0.01), 0.05);
        assert_eq!(clamp_image_size(0.05), 0.05);
        assert_eq!(clamp_image_size(0.5), 0.5);
        assert_eq!(clamp_image_size(f32::NAN), 0.3);
    }

    #[test]
    fn with_dimensions_leaves_original_untouched() {
        let options = QrOptions::default();
        let export = options.with_dimensions(Dimensions::square(1200));

        assert_eq!(export.dimensions.width, 1200);
        assert_eq!(options.dimensions.width, 300);
        assert_eq!(export.content, options.content);
    }

    #[cfg(feature = "jsonschema")]
    #[test]
    fn json_schema_lists_top_level_fields() {
        let schema = schemars::schema_for!(QrOptions);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("dotsOptions"));
        assert!(json.contains("imageOptions"));
    }
}
