//! Preview/Renderer Bridge.
//!
//! Owns the single renderer instance and keeps it in step with the
//! configuration store. The renderer is built lazily on the first sync and
//! updated in place afterwards:
//!
//! ```text
//! Uninitialized ──sync (create + append)──▶ Ready { revision }
//!                                            │
//!                      sync, revision moved  │  update + append
//!                                            ▼
//!                                          Ready { revision' }
//! ```

use tracing::{debug, info, warn};

use crate::error::{ExportError, RenderError};
use crate::export::{ExportRequest, ExportedFile};
use crate::render::{DownloadOptions, PreviewContainer, QrRenderer};
use crate::store::ConfigStore;

/// Lifecycle of the renderer.
#[derive(Debug, Default)]
pub enum BridgeState<R> {
    #[default]
    Uninitialized,
    Ready {
        renderer: R,
        /// Store revision of the last successful render.
        revision: u64,
    },
}

/// Keeps one renderer and one container in sync with a [`ConfigStore`].
#[derive(Debug)]
pub struct PreviewBridge<R, C> {
    state: BridgeState<R>,
    container: C,
}

impl<R: QrRenderer, C: PreviewContainer> PreviewBridge<R, C> {
    pub fn new(container: C) -> Self {
        Self {
            state: BridgeState::Uninitialized,
            container,
        }
    }

    pub fn state(&self) -> &BridgeState<R> {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, BridgeState::Ready { .. })
    }

    /// Returns the live renderer once ready.
    pub fn renderer(&self) -> Option<&R> {
        match &self.state {
            BridgeState::Ready { renderer, .. } => Some(renderer),
            BridgeState::Uninitialized => None,
        }
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Brings the renderer up to date with `store`.
    ///
    /// Creates it on the first call and updates it whenever the store
    /// revision has moved since the last successful render. On failure the
    /// bridge keeps its previous state, so the next sync retries.
    pub fn sync(&mut self, store: &ConfigStore) -> Result<(), RenderError> {
        let result = self.advance(store);
        if let Err(e) = &result {
            warn!(error = %e, revision = store.revision(), "Preview render failed");
        }
        result
    }

    fn advance(&mut self, store: &ConfigStore) -> Result<(), RenderError> {
        let target = store.revision();

        if let BridgeState::Ready { renderer, revision } = &mut self.state {
            if *revision != target {
                renderer.update(store.options())?;
                renderer.append(&mut self.container)?;
                *revision = target;
                debug!(revision = target, "Renderer updated");
            }
            return Ok(());
        }

        let renderer = R::create(store.options())?;
        renderer.append(&mut self.container)?;
        debug!(revision = target, "Renderer ready");
        self.state = BridgeState::Ready {
            renderer,
            revision: target,
        };
        Ok(())
    }

    /// Encodes the current code as a standalone file.
    ///
    /// Fails with [`ExportError::Stale`] while the last edit to `store` has
    /// not rendered, so a file never carries an older configuration than the
    /// one being edited. The live preview keeps its own size.
    pub fn export(
        &self,
        store: &ConfigStore,
        request: ExportRequest,
    ) -> Result<ExportedFile, ExportError> {
        let BridgeState::Ready { renderer, revision } = &self.state else {
            return Err(ExportError::NotReady);
        };
        if *revision != store.revision() {
            return Err(ExportError::Stale {
                rendered: *revision,
                pending: store.revision(),
            });
        }
        let bytes = renderer.download(&DownloadOptions::square(request.format, request.size))?;
        info!(
            format = %request.format,
            size = request.size,
            bytes = bytes.len(),
            "Exported QR code"
        );
        Ok(ExportedFile::new(request.format, bytes))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use crate::options::QrOptions;
    use crate::render::{Preview, PreviewSlot};
    use crate::store::Update;
    use std::cell::Cell;

    thread_local! {
        static CREATED: Cell<usize> = const { Cell::new(0) };
    }

    /// Renderer that records calls and can be told to fail.
    struct CountingRenderer {
        content: String,
        updates: usize,
    }

    impl QrRenderer for CountingRenderer {
        fn create(options: &QrOptions) -> Result<Self, RenderError> {
            if options.content == "fail" {
                return Err(RenderError::Raster {
                    width: 0,
                    height: 0,
                });
            }
            CREATED.with(|c| c.set(c.get() + 1));
            Ok(Self {
                content: options.content.clone(),
                updates: 0,
            })
        }

        fn update(&mut self, options: &QrOptions) -> Result<(), RenderError> {
            if options.content == "fail" {
                return Err(RenderError::Raster {
                    width: 0,
                    height: 0,
                });
            }
            self.content = options.content.clone();
            self.updates += 1;
            Ok(())
        }

        fn append(&self, container: &mut dyn PreviewContainer) -> Result<(), RenderError> {
            container.mount(&Preview {
                svg: self.content.clone(),
                width: 1,
                height: 1,
            })?;
            Ok(())
        }

        fn download(&self, options: &DownloadOptions) -> Result<Vec<u8>, RenderError> {
            Ok(format!("{}@{}", self.content, options.width).into_bytes())
        }
    }

    fn created() -> usize {
        CREATED.with(Cell::get)
    }

    #[test]
    fn first_sync_creates_then_updates_in_place() {
        let mut store = ConfigStore::default();
        let mut bridge: PreviewBridge<CountingRenderer, PreviewSlot> =
            PreviewBridge::new(PreviewSlot::new());
        let before = created();

        bridge.sync(&store).unwrap();
        assert!(bridge.is_ready());
        assert_eq!(created(), before + 1);
        assert_eq!(bridge.container().mounts(), 1);

        store.apply(Update::Content("next".into()));
        bridge.sync(&store).unwrap();
        store.apply(Update::Margin(20));
        bridge.sync(&store).unwrap();

        assert_eq!(created(), before + 1);
        assert_eq!(bridge.renderer().unwrap().updates, 2);
        assert_eq!(bridge.container().current().unwrap().svg, "next");
    }

    #[test]
    fn unchanged_revision_skips_update() {
        let store = ConfigStore::default();
        let mut bridge: PreviewBridge<CountingRenderer, PreviewSlot> =
            PreviewBridge::new(PreviewSlot::new());

        bridge.sync(&store).unwrap();
        bridge.sync(&store).unwrap();

        assert_eq!(bridge.renderer().unwrap().updates, 0);
        assert_eq!(bridge.container().mounts(), 1);
    }

    #[test]
    fn export_before_ready_is_not_ready() {
        let bridge: PreviewBridge<CountingRenderer, PreviewSlot> =
            PreviewBridge::new(PreviewSlot::new());
        let request = ExportRequest {
            format: ExportFormat::Png,
            size: 500,
        };

        assert!(matches!(
            bridge.export(&ConfigStore::default(), request),
            Err(ExportError::NotReady)
        ));
    }

    #[test]
    fn export_uses_requested_size() {
        let store = ConfigStore::default();
        let mut bridge: PreviewBridge<CountingRenderer, PreviewSlot> =
            PreviewBridge::new(PreviewSlot::new());
        bridge.sync(&store).unwrap();

        let request = ExportRequest {
            format: ExportFormat::Svg,
            size: 1200,
        };
        let file = bridge.export(&store, request).unwrap();

        assert_eq!(file.file_name, "qrcode.svg");
        assert!(String::from_utf8(file.bytes).unwrap().ends_with("@1200"));
    }

    #[test]
    fn failed_create_stays_uninitialized() {
        let mut store = ConfigStore::default();
        store.apply(Update::Content("fail".into()));
        let mut bridge: PreviewBridge<CountingRenderer, PreviewSlot> =
            PreviewBridge::new(PreviewSlot::new());

        assert!(bridge.sync(&store).is_err());
        assert!(!bridge.is_ready());

        store.apply(Update::Content("ok".into()));
        bridge.sync(&store).unwrap();
        assert!(bridge.is_ready());
    }

    #[test]
    fn failed_update_is_retried_on_next_sync() {
        let mut store = ConfigStore::default();
        let mut bridge: PreviewBridge<CountingRenderer, PreviewSlot> =
            PreviewBridge::new(PreviewSlot::new());
        bridge.sync(&store).unwrap();

        store.apply(Update::Content("fail".into()));
        assert!(bridge.sync(&store).is_err());
        assert!(matches!(
            bridge.state(),
            BridgeState::Ready { revision: 0, .. }
        ));

        store.apply(Update::Content("fixed".into()));
        bridge.sync(&store).unwrap();
        assert_eq!(bridge.container().current().unwrap().svg, "fixed");
    }

    #[test]
    fn export_refuses_unrendered_revision() {
        let mut store = ConfigStore::default();
        let mut bridge: PreviewBridge<CountingRenderer, PreviewSlot> =
            PreviewBridge::new(PreviewSlot::new());
        bridge.sync(&store).unwrap();
        let request = ExportRequest {
            format: ExportFormat::Svg,
            size: 300,
        };

        store.apply(Update::Content("fail".into()));
        assert!(bridge.sync(&store).is_err());
        assert!(matches!(
            bridge.export(&store, request),
            Err(ExportError::Stale {
                rendered: 0,
                pending: 1
            })
        ));

        store.apply(Update::Content("again".into()));
        bridge.sync(&store).unwrap();
        let file = bridge.export(&store, request).unwrap();
        assert_eq!(String::from_utf8(file.bytes).unwrap(), "again@300");
    }
}
