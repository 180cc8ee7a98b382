//! Rendering boundary.
//!
//! The chart library and the page's drawing surfaces live outside this crate.
//! [`ChartSurface`] is the seam: the editor mounts a widget record when it is
//! materialized, syncs it after geometry or chart edits, and unmounts it on
//! removal. Implementations project the record; they never own state the
//! serializer needs.

use crate::widget::{Widget, WidgetId};

/// Errors raised by a rendering surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No drawing surface could be created or found for the widget.
    #[error("drawing surface unavailable for widget {0}")]
    SurfaceMissing(WidgetId),
    /// The chart library refused the widget's chart model.
    #[error("chart rejected for widget {id}: {reason}")]
    Rejected { id: WidgetId, reason: String },
}

impl crate::error::ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SurfaceMissing(_) => "E_SURFACE_MISSING",
            Self::Rejected { .. } => "E_CHART_REJECTED",
        }
    }
}

/// Where widgets get drawn.
pub trait ChartSurface: Send {
    /// Create the visual element for a newly materialized widget.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if no drawing surface is available or the
    /// chart library rejects the model.
    fn mount(&mut self, widget: &Widget) -> Result<(), RenderError>;

    /// Re-apply chart config and geometry after an edit or resize.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the widget's visual element is missing.
    fn sync(&mut self, widget: &Widget) -> Result<(), RenderError>;

    /// Drop the visual element. Unknown ids are ignored.
    fn unmount(&mut self, id: &WidgetId);
}

/// Surface that draws nothing. Used when the editor runs without a page.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessSurface;

impl ChartSurface for HeadlessSurface {
    fn mount(&mut self, _widget: &Widget) -> Result<(), RenderError> {
        Ok(())
    }

    fn sync(&mut self, _widget: &Widget) -> Result<(), RenderError> {
        Ok(())
    }

    fn unmount(&mut self, _id: &WidgetId) {}
}
