//! Widget records and the in-memory widget arena.
//!
//! The arena is the single source of truth for what is on the canvas. Each
//! record carries a stable id, its chart model, pixel geometry, and a stacking
//! order. Rendering is a projection of these records (see [`crate::render`]);
//! serialization reads records, never the rendered output.
//!
//! Insertion order is preserved and is the order in which widgets are
//! captured into a snapshot set. Z-indices are assigned from a monotonically
//! increasing counter, so the most recently inserted (or most recently
//! brought-to-front) widget is topmost.

#[cfg(test)]
#[path = "widget_test.rs"]
mod widget_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::ChartModel;
use crate::consts::{BASE_Z_INDEX, DEFAULT_WIDGET_HEIGHT, DEFAULT_WIDGET_LEFT, DEFAULT_WIDGET_TOP, DEFAULT_WIDGET_WIDTH};
use crate::snapshot::ChartType;

/// Opaque, stable widget identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Fresh random id, e.g. `widget-3f2a...`.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("widget-{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position and size of a widget in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            left: DEFAULT_WIDGET_LEFT,
            top: DEFAULT_WIDGET_TOP,
            width: DEFAULT_WIDGET_WIDTH,
            height: DEFAULT_WIDGET_HEIGHT,
        }
    }
}

/// One chart widget on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    pub kind: ChartType,
    /// `None` until the chart has been rendered for the first time.
    pub chart: Option<ChartModel>,
    pub geometry: Geometry,
    pub z_index: i64,
}

/// Insertion-ordered collection of widget records keyed by id.
#[derive(Debug)]
pub struct WidgetArena {
    widgets: HashMap<WidgetId, Widget>,
    order: Vec<WidgetId>,
    top_z: i64,
}

impl WidgetArena {
    #[must_use]
    pub fn new() -> Self {
        Self { widgets: HashMap::new(), order: Vec::new(), top_z: BASE_Z_INDEX }
    }

    /// Insert a new record on top of the stack. Returns `None` if the id is
    /// already taken.
    pub fn insert(
        &mut self,
        id: WidgetId,
        kind: ChartType,
        chart: Option<ChartModel>,
        geometry: Geometry,
    ) -> Option<&Widget> {
        if self.widgets.contains_key(&id) {
            return None;
        }
        self.top_z += 1;
        let widget = Widget { id: id.clone(), kind, chart, geometry, z_index: self.top_z };
        self.order.push(id.clone());
        self.widgets.insert(id.clone(), widget);
        self.widgets.get(&id)
    }

    /// Remove a record, returning it if it was present.
    pub fn remove(&mut self, id: &WidgetId) -> Option<Widget> {
        let removed = self.widgets.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Remove every record and reset stacking. Returns the removed ids in
    /// insertion order.
    pub fn clear(&mut self) -> Vec<WidgetId> {
        self.widgets.clear();
        self.top_z = BASE_Z_INDEX;
        std::mem::take(&mut self.order)
    }

    #[must_use]
    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: &WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Raise a widget above every other widget. Returns its new z-index.
    pub fn bring_to_front(&mut self, id: &WidgetId) -> Option<i64> {
        let widget = self.widgets.get_mut(id)?;
        if widget.z_index < self.top_z {
            self.top_z += 1;
            widget.z_index = self.top_z;
        }
        Some(widget.z_index)
    }

    /// Pick an id for a widget being materialized: the requested id when it
    /// is non-empty and free, otherwise a freshly generated one.
    #[must_use]
    pub fn unique_id(&self, requested: Option<&str>) -> WidgetId {
        if let Some(raw) = requested.map(str::trim).filter(|raw| !raw.is_empty()) {
            let id = WidgetId::new(raw);
            if !self.contains(&id) {
                return id;
            }
        }
        loop {
            let id = WidgetId::generate();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.order.iter().filter_map(|id| self.widgets.get(id))
    }

    /// Ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[WidgetId] {
        &self.order
    }

    /// Records sorted bottom-to-top for draw order.
    #[must_use]
    pub fn sorted_by_z(&self) -> Vec<&Widget> {
        let mut widgets: Vec<&Widget> = self.widgets.values().collect();
        widgets.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        widgets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl Default for WidgetArena {
    fn default() -> Self {
        Self::new()
    }
}
