//! qrify: styled QR code configurator
//!
//! This crate holds one QR code configuration, lets a set of editors change
//! it, and keeps a live preview in sync. Codes are drawn as SVG with styled
//! dots, finder corners and an optional centred logo, and can be exported as
//! PNG, JPEG or SVG at a chosen size.
//!
//! # Example
//!
//! ```
//! use qrify::{
//!     Configurator, DotType, ExportFormat, HexColor, PreviewSlot, StyleEditor, StyleLayer,
//!     StyledQrRenderer,
//! };
//!
//! let mut app: Configurator<StyledQrRenderer, PreviewSlot> = Configurator::new(PreviewSlot::new());
//!
//! app.edit_content("https://example.com");
//! app.apply_style(StyleEditor::select_dot_type(DotType::Rounded));
//! app.apply_style(StyleEditor::set_color(StyleLayer::Dots, HexColor::new(40, 60, 200)));
//!
//! // The preview follows every edit
//! let preview = app.bridge().container().current().unwrap();
//! assert!(preview.svg.contains("#283cc8"));
//!
//! app.select_export_format(ExportFormat::Svg);
//! let file = app.export().unwrap();
//! assert_eq!(file.file_name, "qrcode.svg");
//! ```
//!
//! # Serializable Configuration
//!
//! [`QrOptions`] is plain serde data, so a whole configuration can be saved
//! and restored:
//!
//! ```
//! use qrify::{Configurator, PreviewSlot, StyledQrRenderer};
//!
//! let mut app: Configurator<StyledQrRenderer, PreviewSlot> = Configurator::new(PreviewSlot::new());
//! app.edit_content("saved");
//! let json = app.export_json().unwrap();
//!
//! let mut restored: Configurator<StyledQrRenderer, PreviewSlot> =
//!     Configurator::new(PreviewSlot::new());
//! restored.import_json(&json).unwrap();
//! assert_eq!(restored.options().content, "saved");
//! ```

mod app;
mod bridge;
mod content;
mod error;
mod export;
mod logo;
mod options;
pub mod render;
mod store;
mod style;
mod theme;

pub use app::Configurator;
pub use bridge::{BridgeState, PreviewBridge};
pub use content::{ContentEditor, ContentStatus, ContentType, TEL_SCHEME, strip_tel_scheme};
pub use error::{ColorError, ExportError, LogoError, RenderError, StorageError};
pub use export::{
    CUSTOM_SIZE_MAX, CUSTOM_SIZE_MIN, DirectorySaver, ExportFormat, ExportPanel, ExportRequest,
    ExportSize, ExportedFile, FileSaver, SizePreset, clamp_custom_size,
};
pub use logo::{
    ACCEPTED_MIME_TYPES, DataUrl, LogoControls, LogoEditor, LogoFile, format_file_size,
};
pub use options::{
    BackgroundOptions, CornerDotType, CornerSquareType, DEFAULT_CONTENT, Dimensions, DotType,
    ErrorCorrection, HexColor, IMAGE_MARGIN_RANGE, IMAGE_SIZE_RANGE, ImageOptions, LayerOptions,
    MARGIN_RANGE, QrOptions, QrSettings,
};
pub use render::{
    DownloadOptions, Preview, PreviewContainer, PreviewSlot, QrRenderer, StyledQrRenderer,
    SvgFileContainer,
};
pub use store::{ConfigStore, ImageOptionsPatch, LayerPatch, Update};
pub use style::{StyleEditor, StyleLayer, variant_label};
pub use theme::{JsonFileStore, KeyValueStore, MemoryStore, THEME_KEY, Theme, ThemePreference};
