//! Application root.
//!
//! [`Configurator`] owns the single configuration value, every editor's
//! local state and the preview bridge. Editors describe their edits as
//! [`Update`]s; [`Configurator::dispatch`] applies each one and re-syncs the
//! preview whenever the configuration actually changed.
//!
//! # Example
//!
//! ```
//! use qrify::{Configurator, ContentType, PreviewSlot, StyledQrRenderer};
//!
//! let mut app: Configurator<StyledQrRenderer, PreviewSlot> = Configurator::new(PreviewSlot::new());
//! app.select_content_type(ContentType::Phone);
//! app.edit_content("5551234");
//!
//! assert_eq!(app.options().content, "tel:5551234");
//! assert_eq!(app.content_editor().display_value(), "5551234");
//!
//! let file = app.export().unwrap();
//! assert_eq!(file.file_name, "qrcode.png");
//! ```

use tracing::error;

use crate::bridge::PreviewBridge;
use crate::content::{ContentEditor, ContentStatus, ContentType, TEL_SCHEME};
use crate::error::{ExportError, LogoError, RenderError};
use crate::export::{ExportFormat, ExportPanel, ExportSize, ExportedFile, FileSaver};
use crate::logo::{LogoControls, LogoEditor, LogoFile};
use crate::options::QrOptions;
use crate::render::{PreviewContainer, QrRenderer};
use crate::store::{ConfigStore, ImageOptionsPatch, Update};

/// The configurator: store, editors and preview wired together.
pub struct Configurator<R, C> {
    store: ConfigStore,
    content: ContentEditor,
    logo: LogoEditor,
    export: ExportPanel,
    bridge: PreviewBridge<R, C>,
}

impl<R: QrRenderer, C: PreviewContainer> Configurator<R, C> {
    /// Starts with the default configuration and renders the first preview.
    pub fn new(container: C) -> Self {
        Self::with_options(QrOptions::default(), container)
    }

    /// Starts from an existing configuration.
    pub fn with_options(options: QrOptions, container: C) -> Self {
        let store = ConfigStore::new(options);
        let content = editor_for(store.options());
        let mut app = Self {
            store,
            content,
            logo: LogoEditor::new(),
            export: ExportPanel::new(),
            bridge: PreviewBridge::new(container),
        };
        // Failures are logged by the bridge and retried on the next edit
        let _ = app.sync();
        app
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn options(&self) -> &QrOptions {
        self.store.options()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn content_editor(&self) -> &ContentEditor {
        &self.content
    }

    pub fn content_status(&self) -> ContentStatus {
        self.content.status()
    }

    pub fn logo_editor(&self) -> &LogoEditor {
        &self.logo
    }

    /// Logo adjustment controls, `None` while no logo is set.
    pub fn logo_controls(&self) -> Option<LogoControls<'_>> {
        LogoEditor::controls(self.store.options())
    }

    pub fn export_panel(&self) -> &ExportPanel {
        &self.export
    }

    pub fn bridge(&self) -> &PreviewBridge<R, C> {
        &self.bridge
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Applies one edit and re-syncs the preview if anything changed.
    ///
    /// Returns true if the configuration changed. A render failure does not
    /// undo the edit.
    pub fn dispatch(&mut self, update: Update) -> bool {
        let changed = self.store.apply(update);
        if changed {
            let _ = self.sync();
        }
        changed
    }

    /// Pushes the current configuration to the renderer.
    pub fn sync(&mut self) -> Result<(), RenderError> {
        self.bridge.sync(&self.store)
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    pub fn edit_content(&mut self, raw: &str) -> bool {
        let update = self.content.input(raw);
        self.dispatch(update)
    }

    pub fn select_content_type(&mut self, content_type: ContentType) -> bool {
        let update = self.content.select_type(content_type);
        self.dispatch(update)
    }

    // ------------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------------

    /// Applies an edit produced by [`StyleEditor`](crate::StyleEditor).
    pub fn apply_style(&mut self, update: Update) -> bool {
        self.dispatch(update)
    }

    // ------------------------------------------------------------------------
    // Logo
    // ------------------------------------------------------------------------

    /// Accepts a PNG or SVG logo. Rejected files leave everything unchanged.
    pub fn upload_logo(&mut self, file: &LogoFile) -> Result<bool, LogoError> {
        let update = self.logo.upload(file)?;
        Ok(self.dispatch(update))
    }

    pub fn remove_logo(&mut self) -> bool {
        let update = self.logo.remove();
        self.dispatch(update)
    }

    /// Adjusts logo size, margin or dot hiding. Inert while no logo is set.
    pub fn adjust_logo(&mut self, patch: ImageOptionsPatch) -> bool {
        if self.logo_controls().is_none() {
            return false;
        }
        self.dispatch(Update::ImageOptions(patch))
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    pub fn select_export_format(&mut self, format: ExportFormat) {
        self.export.select_format(format);
    }

    pub fn select_export_size(&mut self, size: ExportSize) {
        self.export.select_size(size);
    }

    /// Sets a custom export size, clipped to 100..=2000. Returns the stored value.
    pub fn set_custom_export_size(&mut self, pixels: u32) -> u32 {
        self.export.set_custom_size(pixels)
    }

    /// Encodes the current code with the export panel's format and size.
    ///
    /// Fails with [`ExportError::Stale`] while the latest edit has not
    /// rendered; call [`sync`](Self::sync) to see why.
    pub fn export(&self) -> Result<ExportedFile, ExportError> {
        let request = self.export.request();
        self.bridge.export(&self.store, request).inspect_err(|e| {
            error!(
                error = %e,
                format = %request.format,
                size = request.size,
                "Export failed"
            );
        })
    }

    /// Exports and hands the file to `saver`.
    pub fn download_to(&self, saver: &mut dyn FileSaver) -> Result<ExportedFile, ExportError> {
        let file = self.export()?;
        saver
            .save(&file)
            .map_err(|source| ExportError::Save {
                file_name: file.file_name.clone(),
                source,
            })
            .inspect_err(|e| error!(error = %e, "Saving export failed"))?;
        Ok(file)
    }

    // ------------------------------------------------------------------------
    // JSON
    // ------------------------------------------------------------------------

    /// Replaces the whole configuration from JSON. Returns true if it changed.
    pub fn import_json(&mut self, json: &str) -> Result<bool, serde_json::Error> {
        let options = QrOptions::from_json(json)?;
        let changed = self.store.replace(options);
        if changed {
            self.content = editor_for(self.store.options());
            if !self.store.options().has_logo() {
                self.logo = LogoEditor::new();
            }
            let _ = self.sync();
        }
        Ok(changed)
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.store.options().to_json_pretty()
    }
}

/// Picks the content type matching a stored payload.
fn editor_for(options: &QrOptions) -> ContentEditor {
    let content = &options.content;
    let is_phone = content
        .get(..TEL_SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(TEL_SCHEME));
    let content_type = if is_phone {
        ContentType::Phone
    } else {
        ContentType::Url
    };
    ContentEditor::new(content_type, content)
}

// ============================================================================
// Tests
// ============================================================================
