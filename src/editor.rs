//! Dashboard editor aggregate.
//!
//! DESIGN
//! ======
//! `Editor` owns everything a single editing session mutates: the widget
//! arena, the canvas-size negotiator, the session (snapshot store plus
//! restoration-source flag), and the rendering surface. User-level operations
//! live here; each one that changes the layout ends with a local persist so
//! the snapshot store always reflects the canvas.
//!
//! Materialization takes a [`SaveMode`] so bulk loads can place many widgets
//! and persist once at the end instead of after every widget.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use tracing::{info, warn};

use crate::canvas_size::{CanvasSizeNegotiator, SizeOption};
use crate::chart::{ChartEdit, ChartModel};
use crate::error::ErrorCode;
use crate::render::{ChartSurface, HeadlessSurface, RenderError};
use crate::save::{capture_current_state, persist_locally};
use crate::serializer::{self, MaterializeError};
use crate::snapshot::{CanvasSize, ChartConfig, ChartType, PixelSize, SnapshotSet, WidgetSnapshot};
use crate::store::{self, Session, SnapshotStore, StoreError};
use crate::widget::{WidgetArena, WidgetId};

// =============================================================================
// TYPES
// =============================================================================

/// Whether a layout change is written to the snapshot store right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Persist,
    Skip,
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("widget not found: {0}")]
    WidgetNotFound(WidgetId),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for EditorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WidgetNotFound(_) => "E_WIDGET_NOT_FOUND",
            Self::Materialize(e) => e.error_code(),
            Self::Render(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }
}

/// Result of placing a batch of snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub restored: usize,
    pub skipped: usize,
}

pub struct Editor<S> {
    pub(crate) widgets: WidgetArena,
    pub(crate) canvas: CanvasSizeNegotiator,
    pub(crate) session: Session<S>,
    pub(crate) surface: Box<dyn ChartSurface>,
}

// =============================================================================
// CONSTRUCTION + ACCESS
// =============================================================================

impl<S: SnapshotStore> Editor<S> {
    #[must_use]
    pub fn new(store: S, surface: Box<dyn ChartSurface>) -> Self {
        Self {
            widgets: WidgetArena::new(),
            canvas: CanvasSizeNegotiator::new(),
            session: Session::new(store),
            surface,
        }
    }

    /// Editor that draws nothing.
    #[must_use]
    pub fn headless(store: S) -> Self {
        Self::new(store, Box::new(HeadlessSurface))
    }

    #[must_use]
    pub fn widgets(&self) -> &WidgetArena {
        &self.widgets
    }

    #[must_use]
    pub fn canvas(&self) -> &CanvasSizeNegotiator {
        &self.canvas
    }

    #[must_use]
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<S> {
        &mut self.session
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Current view as a snapshot set.
    #[must_use]
    pub fn capture(&self) -> SnapshotSet {
        capture_current_state(&self.widgets, &self.canvas)
    }

    /// Capture the current view and write it to the snapshot store.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if encoding fails.
    pub fn persist_locally(&mut self) -> Result<SnapshotSet, StoreError> {
        let set = self.capture();
        persist_locally(self.session.store_mut(), &set)?;
        Ok(set)
    }

    /// Place one widget from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if mounting fails or, with [`SaveMode::Persist`], if
    /// the local persist fails.
    pub fn materialize(&mut self, snapshot: &WidgetSnapshot, mode: SaveMode) -> Result<WidgetId, EditorError> {
        let id = serializer::materialize(&mut self.widgets, self.surface.as_mut(), snapshot)?;
        if mode == SaveMode::Persist {
            self.persist_locally()?;
        }
        Ok(id)
    }

    /// Place snapshots in order without persisting. Failures are skipped.
    pub fn materialize_all(&mut self, snapshots: &[WidgetSnapshot]) -> MaterializeReport {
        let mut report = MaterializeReport::default();
        for (index, snapshot) in snapshots.iter().enumerate() {
            match serializer::materialize(&mut self.widgets, self.surface.as_mut(), snapshot) {
                Ok(_) => report.restored += 1,
                Err(e) => {
                    warn!(index, kind = %snapshot.chart_type, error = %e, "skipping widget");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Remove every widget from the canvas. Does not persist.
    pub fn clear_widgets(&mut self) {
        for id in self.widgets.clear() {
            self.surface.unmount(&id);
        }
    }

    /// Load a server payload: replace the canvas, refresh the local cache, and
    /// flag the session so the next restoration pass leaves it alone.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the local persist fails.
    pub fn load_server_snapshot(&mut self, set: &SnapshotSet) -> Result<MaterializeReport, EditorError> {
        self.clear_widgets();
        self.apply_canvas_size(set.canvas_size);
        self.session.store_mut().remove(crate::consts::WIDGET_LIST_KEY);
        let report = self.materialize_all(&set.widgets);
        self.persist_locally()?;
        self.session.mark_server_load();
        info!(restored = report.restored, skipped = report.skipped, "server dashboard loaded");
        Ok(report)
    }

    /// Drop both cached keys. Called when leaving the editor.
    pub fn clear_session(&mut self) {
        store::clear(self.session.store_mut());
    }

    // =========================================================================
    // WIDGET OPERATIONS
    // =========================================================================

    /// Add a chart at the default position and size.
    ///
    /// # Errors
    ///
    /// Returns an error if mounting or the local persist fails.
    pub fn add_chart(&mut self, kind: ChartType, config: ChartConfig) -> Result<WidgetId, EditorError> {
        let id = self.materialize(&WidgetSnapshot::partial(kind, config), SaveMode::Persist)?;
        info!(widget_id = %id, %kind, "chart added");
        Ok(id)
    }

    /// Remove a widget and persist.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::WidgetNotFound`] for unknown ids.
    pub fn delete_widget(&mut self, id: &WidgetId) -> Result<(), EditorError> {
        if self.widgets.remove(id).is_none() {
            return Err(EditorError::WidgetNotFound(id.clone()));
        }
        self.surface.unmount(id);
        self.persist_locally()?;
        info!(widget_id = %id, "widget deleted");
        Ok(())
    }

    /// Apply a customization edit to a widget's chart, re-sync, and persist.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::WidgetNotFound`] for unknown ids, or a render or
    /// store error.
    pub fn customize(&mut self, id: &WidgetId, edit: ChartEdit) -> Result<(), EditorError> {
        let Some(widget) = self.widgets.get_mut(id) else {
            return Err(EditorError::WidgetNotFound(id.clone()));
        };
        let kind = widget.kind;
        widget.chart.get_or_insert_with(|| ChartModel::empty(kind)).apply_edit(edit);
        self.surface.sync(widget)?;
        self.persist_locally()?;
        Ok(())
    }

    // =========================================================================
    // CANVAS SIZE
    // =========================================================================

    /// Apply a descriptor to the canvas. Does not persist.
    pub fn apply_canvas_size(&mut self, size: CanvasSize) -> PixelSize {
        self.canvas.apply(size)
    }

    /// Handle a size selector change; presets are applied and persisted.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the local persist fails.
    pub fn select_canvas_size(&mut self, option: SizeOption) -> Result<Option<CanvasSize>, EditorError> {
        let applied = self.canvas.select(option);
        if applied.is_some() {
            self.persist_locally()?;
        }
        Ok(applied)
    }

    /// Apply custom dimensions from the two inputs and persist. Inputs that do
    /// not parse to positive integers leave the canvas unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the local persist fails.
    pub fn set_custom_canvas_size(&mut self, width: &str, height: &str) -> Result<Option<CanvasSize>, EditorError> {
        self.canvas.set_custom_inputs(width, height);
        let applied = self.canvas.apply_custom_inputs();
        if applied.is_some() {
            self.persist_locally()?;
        }
        Ok(applied)
    }
}
