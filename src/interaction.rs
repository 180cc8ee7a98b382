//! Drag and resize callbacks.
//!
//! The gesture source (pointer handling, inertia, snapping) lives outside the
//! crate and calls into an [`InteractionHandler`]. The editor implements it:
//! moves mutate the widget record and re-sync the surface, gesture ends clamp
//! and persist.

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;

use tracing::debug;

use crate::consts::{MIN_WIDGET_HEIGHT, MIN_WIDGET_WIDTH};
use crate::editor::{Editor, EditorError};
use crate::store::SnapshotStore;
use crate::widget::WidgetId;

/// Size reported by a resize move plus how far the top-left corner shifted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResizeRect {
    pub width: f64,
    pub height: f64,
    pub delta_left: f64,
    pub delta_top: f64,
}

/// One event from the gesture source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    DragStart,
    DragMove { dx: f64, dy: f64 },
    DragEnd,
    ResizeMove(ResizeRect),
    ResizeEnd,
}

/// Capability interface for drag/resize gesture callbacks.
pub trait InteractionHandler {
    /// Raise the widget above all others.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown widgets.
    fn on_drag_start(&mut self, id: &WidgetId) -> Result<(), EditorError>;

    /// Translate the widget by `(dx, dy)`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown widgets or if the surface sync fails.
    fn on_drag_move(&mut self, id: &WidgetId, dx: f64, dy: f64) -> Result<(), EditorError>;

    /// Clamp the widget into the canvas and persist.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown widgets or if persisting fails.
    fn on_drag_end(&mut self, id: &WidgetId) -> Result<(), EditorError>;

    /// Resize the widget, honoring the minimum size, and re-sync the chart.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown widgets or if the surface sync fails.
    fn on_resize_move(&mut self, id: &WidgetId, rect: ResizeRect) -> Result<(), EditorError>;

    /// Persist after a resize.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown widgets or if persisting fails.
    fn on_resize_end(&mut self, id: &WidgetId) -> Result<(), EditorError>;

    /// Route a gesture event to the matching callback.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error.
    fn dispatch(&mut self, id: &WidgetId, gesture: Gesture) -> Result<(), EditorError> {
        match gesture {
            Gesture::DragStart => self.on_drag_start(id),
            Gesture::DragMove { dx, dy } => self.on_drag_move(id, dx, dy),
            Gesture::DragEnd => self.on_drag_end(id),
            Gesture::ResizeMove(rect) => self.on_resize_move(id, rect),
            Gesture::ResizeEnd => self.on_resize_end(id),
        }
    }
}

impl<S: SnapshotStore> InteractionHandler for Editor<S> {
    fn on_drag_start(&mut self, id: &WidgetId) -> Result<(), EditorError> {
        let z_index = self.widgets.bring_to_front(id).ok_or_else(|| EditorError::WidgetNotFound(id.clone()))?;
        debug!(widget_id = %id, z_index, "drag start");
        Ok(())
    }

    fn on_drag_move(&mut self, id: &WidgetId, dx: f64, dy: f64) -> Result<(), EditorError> {
        let widget = self.widgets.get_mut(id).ok_or_else(|| EditorError::WidgetNotFound(id.clone()))?;
        widget.geometry.left += dx;
        widget.geometry.top += dy;
        self.surface.sync(widget)?;
        Ok(())
    }

    fn on_drag_end(&mut self, id: &WidgetId) -> Result<(), EditorError> {
        let bounds = self.canvas.rendered();
        let widget = self.widgets.get_mut(id).ok_or_else(|| EditorError::WidgetNotFound(id.clone()))?;
        let g = &mut widget.geometry;
        g.left = clamp_axis(g.left, g.width, f64::from(bounds.width));
        g.top = clamp_axis(g.top, g.height, f64::from(bounds.height));
        self.surface.sync(widget)?;
        self.persist_locally()?;
        Ok(())
    }

    fn on_resize_move(&mut self, id: &WidgetId, rect: ResizeRect) -> Result<(), EditorError> {
        let widget = self.widgets.get_mut(id).ok_or_else(|| EditorError::WidgetNotFound(id.clone()))?;
        let g = &mut widget.geometry;
        g.width = rect.width.max(MIN_WIDGET_WIDTH);
        g.height = rect.height.max(MIN_WIDGET_HEIGHT);
        g.left += rect.delta_left;
        g.top += rect.delta_top;
        self.surface.sync(widget)?;
        Ok(())
    }

    fn on_resize_end(&mut self, id: &WidgetId) -> Result<(), EditorError> {
        if !self.widgets.contains(id) {
            return Err(EditorError::WidgetNotFound(id.clone()));
        }
        self.persist_locally()?;
        Ok(())
    }
}

/// Keep `[start, start + extent]` inside `[0, limit]`, pinning to the origin
/// when the widget is larger than the canvas.
fn clamp_axis(start: f64, extent: f64, limit: f64) -> f64 {
    start.min(limit - extent).max(0.0)
}
