//! Widget serializer: live widget record <-> [`WidgetSnapshot`].
//!
//! `serialize` is a pure read of the arena record. `materialize` is the
//! inverse: it registers a new record in the arena and mounts it on the
//! rendering surface. Neither touches the snapshot store; callers decide
//! whether a local persist follows.

#[cfg(test)]
#[path = "serializer_test.rs"]
mod serializer_test;

use tracing::{debug, warn};

use crate::chart::ChartModel;
use crate::render::{ChartSurface, RenderError};
use crate::snapshot::{ChartConfig, WidgetSnapshot, format_px, parse_px};
use crate::widget::{Geometry, Widget, WidgetArena, WidgetId};

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("widget id already in use: {0}")]
    DuplicateId(WidgetId),
    #[error("failed to mount widget {id}: {source}")]
    Render {
        id: WidgetId,
        #[source]
        source: RenderError,
    },
}

impl crate::error::ErrorCode for MaterializeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateId(_) => "E_DUPLICATE_WIDGET",
            Self::Render { .. } => "E_MOUNT_FAILED",
        }
    }
}

/// Capture a widget record as a snapshot.
///
/// A widget whose chart has not been rendered yet yields a default config.
#[must_use]
pub fn serialize(widget: &Widget) -> WidgetSnapshot {
    let config = widget.chart.as_ref().map_or_else(ChartConfig::default, ChartModel::to_config);
    let g = widget.geometry;
    WidgetSnapshot {
        id: Some(widget.id.as_str().to_owned()),
        chart_type: widget.kind,
        config,
        left: Some(format_px(g.left)),
        top: Some(format_px(g.top)),
        width: Some(format_px(g.width)),
        height: Some(format_px(g.height)),
    }
}

/// Geometry encoded in a snapshot. Missing or unparseable fields fall back to
/// the default position and size.
#[must_use]
pub fn geometry_from(snapshot: &WidgetSnapshot) -> Geometry {
    let defaults = Geometry::default();
    let read = |raw: Option<&String>, fallback: f64| raw.and_then(|r| parse_px(r)).unwrap_or(fallback);
    Geometry {
        left: read(snapshot.left.as_ref(), defaults.left),
        top: read(snapshot.top.as_ref(), defaults.top),
        width: read(snapshot.width.as_ref(), defaults.width),
        height: read(snapshot.height.as_ref(), defaults.height),
    }
}

/// Rebuild a widget from a snapshot and mount it.
///
/// The snapshot id is kept when it is free; otherwise a fresh id is assigned.
/// If mounting fails the record is removed again.
///
/// # Errors
///
/// Returns [`MaterializeError::Render`] if the surface refuses the widget.
pub fn materialize(
    arena: &mut WidgetArena,
    surface: &mut dyn ChartSurface,
    snapshot: &WidgetSnapshot,
) -> Result<WidgetId, MaterializeError> {
    let requested = snapshot.id.as_deref();
    let id = arena.unique_id(requested);
    if let Some(raw) = requested
        && raw != id.as_str()
    {
        warn!(requested = raw, assigned = %id, "widget id collision; assigned fresh id");
    }

    let chart = ChartModel::from_config(snapshot.chart_type, &snapshot.config);
    let geometry = geometry_from(snapshot);
    let Some(widget) = arena.insert(id.clone(), snapshot.chart_type, Some(chart), geometry) else {
        return Err(MaterializeError::DuplicateId(id));
    };

    if let Err(source) = surface.mount(widget) {
        arena.remove(&id);
        return Err(MaterializeError::Render { id, source });
    }

    debug!(widget_id = %id, kind = %snapshot.chart_type, "widget materialized");
    Ok(id)
}
