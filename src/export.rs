//! Export panel: output format, pixel size and the save collaborator.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Inclusive bounds of a custom export size, in pixels.
pub const CUSTOM_SIZE_MIN: u32 = 100;
pub const CUSTOM_SIZE_MAX: u32 = 2000;

/// Custom size offered before the user types one.
pub const DEFAULT_CUSTOM_SIZE: u32 = 1000;

// ============================================================================
// ExportFormat
// ============================================================================

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    /// Lossless raster.
    #[default]
    Png,
    /// Lossy raster.
    Jpeg,
    /// Vector.
    Svg,
}

impl ExportFormat {
    pub const ALL: [Self; 3] = [Self::Png, Self::Jpeg, Self::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Svg => "svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Svg => "SVG",
        }
    }

    /// Name of the downloaded file, `qrcode.<ext>`.
    pub fn file_name(self) -> String {
        format!("qrcode.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// ExportSize
// ============================================================================

/// Fixed export sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Small,
    #[default]
    Medium,
    Large,
    #[serde(rename = "xlarge")]
    ExtraLarge,
}

impl SizePreset {
    pub const ALL: [Self; 4] = [Self::Small, Self::Medium, Self::Large, Self::ExtraLarge];

    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 300,
            Self::Medium => 500,
            Self::Large => 800,
            Self::ExtraLarge => 1200,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::ExtraLarge => "Extra Large",
        }
    }

    /// Looks up a preset by its id (`small`, `medium`, `large`, `xlarge`).
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "xlarge" => Some(Self::ExtraLarge),
            _ => None,
        }
    }
}

/// Either a preset or a custom pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSize {
    Preset(SizePreset),
    Custom(u32),
}

impl ExportSize {
    /// A custom size clipped to the allowed range.
    pub fn custom(pixels: u32) -> Self {
        Self::Custom(clamp_custom_size(pixels))
    }

    /// Resolves the size in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            Self::Preset(preset) => preset.pixels(),
            Self::Custom(pixels) => clamp_custom_size(pixels),
        }
    }
}

impl Default for ExportSize {
    fn default() -> Self {
        Self::Preset(SizePreset::default())
    }
}

pub fn clamp_custom_size(pixels: u32) -> u32 {
    pixels.clamp(CUSTOM_SIZE_MIN, CUSTOM_SIZE_MAX)
}

// ============================================================================
// ExportPanel
// ============================================================================

/// A resolved export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub size: u32,
}

/// Export panel state: the last chosen format and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPanel {
    format: ExportFormat,
    size: ExportSize,
    custom_size: u32,
}

impl Default for ExportPanel {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            size: ExportSize::default(),
            custom_size: DEFAULT_CUSTOM_SIZE,
        }
    }
}

impl ExportPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn size(&self) -> ExportSize {
        self.size
    }

    /// Value shown in the custom size field.
    pub fn custom_size(&self) -> u32 {
        self.custom_size
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.size, ExportSize::Custom(_))
    }

    pub fn select_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    pub fn select_preset(&mut self, preset: SizePreset) {
        self.size = ExportSize::Preset(preset);
    }

    /// Switches to the custom size, keeping the last entered value.
    pub fn select_custom(&mut self) {
        self.size = ExportSize::Custom(self.custom_size);
    }

    /// Sets the custom size, clipped to 100..=2000. Returns the stored value.
    pub fn set_custom_size(&mut self, pixels: u32) -> u32 {
        self.custom_size = clamp_custom_size(pixels);
        self.size = ExportSize::Custom(self.custom_size);
        self.custom_size
    }

    /// Applies any [`ExportSize`] choice.
    pub fn select_size(&mut self, size: ExportSize) {
        match size {
            ExportSize::Preset(preset) => self.select_preset(preset),
            ExportSize::Custom(pixels) => {
                self.set_custom_size(pixels);
            }
        }
    }

    /// Resolves the current choice into a request.
    pub fn request(&self) -> ExportRequest {
        ExportRequest {
            format: self.format,
            size: self.size.pixels(),
        }
    }
}

// ============================================================================
// ExportedFile
// ============================================================================

/// An encoded file ready to be saved.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format.file_name(),
            mime: format.mime_type(),
            bytes,
        }
    }

    /// The file as an inline `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for ExportedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedFile")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ============================================================================
// FileSaver
// ============================================================================

/// Save collaborator: hands an exported file to the user.
pub trait FileSaver {
    fn save(&mut self, file: &ExportedFile) -> io::Result<()>;
}

/// Writes exported files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, file: &ExportedFile) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&file.file_name);
        fs::write(&path, &file.bytes)?;
        info!(path = %path.display(), bytes = file.bytes.len(), "Saved QR code");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_size_bounds_are_inclusive() {
        let mut panel = ExportPanel::new();

        assert_eq!(panel.set_custom_size(100), 100);
        assert_eq!(panel.request().size, 100);
        assert_eq!(panel.set_custom_size(2000), 2000);
        assert_eq!(panel.request().size, 2000);
    }

    #[test]
    fn custom_size_outside_range_is_clipped() {
        let mut panel = ExportPanel::new();

        assert_eq!(panel.set_custom_size(99), 100);
        assert_eq!(panel.set_custom_size(0), 100);
        assert_eq!(panel.set_custom_size(2001), 2000);
        assert_eq!(ExportSize::Custom(5000).pixels(), 2000);
        assert_eq!(ExportSize::custom(12), ExportSize::Custom(100));
    }

    #[test]
    fn defaults_are_png_medium() {
        let panel = ExportPanel::new();
        assert_eq!(
            panel.request(),
            ExportRequest {
                format: ExportFormat::Png,
                size: 500
            }
        );
        assert_eq!(panel.custom_size(), 1000);
        assert!(!panel.is_custom());
    }

    #[test]
    fn selected_preset_is_honoured() {
        let mut panel = ExportPanel::new();
        panel.select_preset(SizePreset::ExtraLarge);
        panel.select_format(ExportFormat::Svg);

        assert_eq!(panel.request().size, 1200);
        assert_eq!(panel.request().format, ExportFormat::Svg);
    }

    #[test]
    fn switching_back_to_custom_remembers_value() {
        let mut panel = ExportPanel::new();
        panel.set_custom_size(640);
        panel.select_preset(SizePreset::Small);
        assert_eq!(panel.request().size, 300);

        panel.select_custom();
        assert_eq!(panel.request().size, 640);
    }

    #[test]
    fn file_names_follow_extension() {
        assert_eq!(ExportFormat::Png.file_name(), "qrcode.png");
        assert_eq!(ExportFormat::Jpeg.file_name(), "qrcode.jpeg");
        assert_eq!(ExportFormat::Svg.file_name(), "qrcode.svg");
    }

    #[test]
    fn preset_ids_resolve() {
        assert_eq!(SizePreset::from_id("xlarge"), Some(SizePreset::ExtraLarge));
        assert_eq!(SizePreset::from_id("huge"), None);
    }

    #[test]
    fn data_url_carries_mime() {
        let file = ExportedFile::new(ExportFormat::Svg, b"<svg/>".to_vec());
        assert_eq!(file.to_data_url(), "data:image/svg+xml;base64,PHN2Zy8+");
    }

    #[test]
    fn directory_saver_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = DirectorySaver::new(dir.path().join("out"));
        let file = ExportedFile::new(ExportFormat::Png, vec![1, 2, 3]);

        saver.save(&file).unwrap();

        let written = std::fs::read(dir.path().join("out").join("qrcode.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }
}
