//! Logo editor: upload, removal and sizing of the embedded logo.
//!
//! An accepted file is converted to an inline `data:` URL and stored in
//! [`QrOptions::image`]. Size, margin and background-hiding controls are only
//! reachable through [`LogoEditor::controls`], which yields nothing while no
//! logo is set.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

use crate::error::LogoError;
use crate::options::{IMAGE_MARGIN_RANGE, IMAGE_SIZE_RANGE, ImageOptions, QrOptions};
use crate::store::{ImageOptionsPatch, Update};

/// Mime types accepted for upload.
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/png", "image/svg+xml"];

// ============================================================================
// LogoFile
// ============================================================================

#[derive(Debug, Clone)]
enum LogoBytes {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file offered for upload: a name, a declared mime type and its bytes.
#[derive(Debug, Clone)]
pub struct LogoFile {
    name: String,
    mime: Option<String>,
    bytes: LogoBytes,
}

impl LogoFile {
    /// A file on disk; the mime type is guessed from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            mime: mime_guess::from_path(path).first_raw().map(str::to_string),
            bytes: LogoBytes::Path(path.to_path_buf()),
        }
    }

    /// An in-memory file with an explicit mime type.
    pub fn from_bytes(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes: LogoBytes::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared mime type, or an empty string when unknown.
    pub fn mime_type(&self) -> &str {
        self.mime.as_deref().unwrap_or("")
    }

    /// Reads the file contents.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        match &self.bytes {
            LogoBytes::Path(path) => fs::read(path),
            LogoBytes::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Returns the normalized mime type if it is one of [`ACCEPTED_MIME_TYPES`].
fn accepted_mime(declared: &str) -> Option<&'static str> {
    let essence = declared.split(';').next().unwrap_or("").trim();
    ACCEPTED_MIME_TYPES
        .iter()
        .copied()
        .find(|accepted| accepted.eq_ignore_ascii_case(essence))
}

// ============================================================================
// DataUrl
// ============================================================================

/// An inline `data:<mime>;base64,<payload>` resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Parses a data URL. Non-base64 payloads are taken as literal bytes.
    pub fn parse(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;

        let (mime, is_base64) = match meta.strip_suffix(";base64") {
            Some(mime) => (mime, true),
            None => (meta, false),
        };
        let mime = mime.split(';').next().unwrap_or("").trim();

        let bytes = if is_base64 {
            STANDARD.decode(payload.trim()).ok()?
        } else {
            payload.as_bytes().to_vec()
        };

        Some(Self::new(mime, bytes))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Formats a byte count for display, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

// ============================================================================
// LogoEditor
// ============================================================================

/// Editor state for the logo: which file the picker currently holds.
#[derive(Debug, Clone, Default)]
pub struct LogoEditor {
    selected_file: Option<String>,
}

impl LogoEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the file currently held by the picker.
    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    /// Validates and reads a file, producing the update that stores it.
    ///
    /// On error the editor state is unchanged and no update is produced.
    pub fn upload(&mut self, file: &LogoFile) -> Result<Update, LogoError> {
        let mime = accepted_mime(file.mime_type())
            .ok_or_else(|| LogoError::UnsupportedType(file.mime_type().to_string()))?;
        let bytes = file.read()?;

        info!(
            file = %file.name(),
            mime,
            size = %format_file_size(bytes.len() as u64),
            "Logo loaded"
        );

        self.selected_file = Some(file.name().to_string());
        Ok(Update::Image(DataUrl::new(mime, bytes).to_string()))
    }

    /// Clears the logo and resets the picker so the same file can be re-selected.
    pub fn remove(&mut self) -> Update {
        debug!(file = ?self.selected_file, "Logo removed");
        self.selected_file = None;
        Update::Image(String::new())
    }

    /// Returns the sizing controls, or `None` while no logo is set.
    pub fn controls(options: &QrOptions) -> Option<LogoControls<'_>> {
        options.has_logo().then_some(LogoControls {
            image_options: &options.image_options,
        })
    }
}

// ============================================================================
// LogoControls
// ============================================================================

/// Logo sizing controls. Only obtainable while a logo is set.
#[derive(Debug, Clone, Copy)]
pub struct LogoControls<'a> {
    image_options: &'a ImageOptions,
}

impl LogoControls<'_> {
    pub fn image_size(&self) -> f32 {
        self.image_options.image_size
    }

    /// Logo size as a rounded percentage, as shown next to the slider.
    pub fn size_percent(&self) -> u32 {
        (self.image_options.image_size * 100.0).round() as u32
    }

    pub fn margin(&self) -> u32 {
        self.image_options.margin
    }

    pub fn hide_background_dots(&self) -> bool {
        self.image_options.hide_background_dots
    }

    pub fn size_range(&self) -> std::ops::RangeInclusive<f32> {
        IMAGE_SIZE_RANGE
    }

    pub fn margin_range(&self) -> std::ops::RangeInclusive<u32> {
        IMAGE_MARGIN_RANGE
    }

    pub fn set_size(&self, image_size: f32) -> Update {
        Update::ImageOptions(ImageOptionsPatch {
            image_size: Some(image_size),
            ..Default::default()
        })
    }

    pub fn set_margin(&self, margin: u32) -> Update {
        Update::ImageOptions(ImageOptionsPatch {
            margin: Some(margin),
            ..Default::default()
        })
    }

    pub fn set_hide_background_dots(&self, hide: bool) -> Update {
        Update::ImageOptions(ImageOptionsPatch {
            hide_background_dots: Some(hide),
            ..Default::default()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
