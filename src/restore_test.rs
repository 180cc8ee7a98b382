#![allow(clippy::float_cmp)]

use std::cell::Cell;

use serde_json::json;

use super::*;
use crate::render::{ChartSurface, RenderError};
use crate::snapshot::{ChartType, PixelSize, SnapshotSet};
use crate::store::MemoryStore;
use crate::widget::{Widget, WidgetId};

/// Store that counts reads.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    reads: Cell<usize>,
}

impl SnapshotStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.reads.set(self.reads.get() + 1);
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.inner.set(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.inner.remove(key);
    }
}

/// Surface that refuses to mount one widget id.
struct RejectingSurface {
    reject: &'static str,
}

impl ChartSurface for RejectingSurface {
    fn mount(&mut self, widget: &Widget) -> Result<(), RenderError> {
        if widget.id.as_str() == self.reject {
            return Err(RenderError::SurfaceMissing(widget.id.clone()));
        }
        Ok(())
    }

    fn sync(&mut self, _widget: &Widget) -> Result<(), RenderError> {
        Ok(())
    }

    fn unmount(&mut self, _id: &WidgetId) {}
}

fn editor_with(widgets: &serde_json::Value, canvas: Option<&serde_json::Value>) -> Editor<MemoryStore> {
    let mut store = MemoryStore::new();
    store.set(WIDGET_LIST_KEY, widgets.to_string());
    if let Some(canvas) = canvas {
        store.set(CANVAS_SIZE_KEY, canvas.to_string());
    }
    Editor::headless(store)
}

#[test]
fn restores_stored_custom_canvas_and_widget() {
    let widgets = json!([{
        "id": "w1",
        "type": "bar",
        "left": "40px",
        "top": "60px",
        "width": "200px",
        "height": "150px",
        "config": { "title": "Sales", "xAxisData": ["Q1"], "seriesData": [{ "name": "Revenue", "data": [3] }] }
    }]);
    let canvas = json!({ "type": "custom", "width": 600, "height": 400 });
    let mut editor = editor_with(&widgets, Some(&canvas));

    let outcome = RestorationEngine::new().run(&mut editor).unwrap();

    assert_eq!(outcome, RestoreOutcome::SessionRestoreApplied { restored: 1, skipped: 0 });
    assert_eq!(editor.canvas().rendered(), PixelSize { width: 600, height: 400 });
    assert_eq!(editor.widgets().len(), 1);
    let widget = editor.widgets().iter().next().unwrap();
    assert_eq!(widget.kind, ChartType::Bar);
    assert_eq!((widget.geometry.left, widget.geometry.top), (40.0, 60.0));
    assert_eq!((widget.geometry.width, widget.geometry.height), (200.0, 150.0));
    assert_eq!(widget.chart.as_ref().unwrap().title, "Sales");
}

#[test]
fn restores_sales_scenario_with_generated_labels() {
    let widgets = json!([{
        "id": "w1",
        "type": "bar",
        "left": "40px",
        "top": "60px",
        "width": "200px",
        "height": "150px",
        "config": {
            "title": "Sales",
            "seriesData": [{ "name": "Q1", "data": [10, 20], "backgroundColor": ["#fff", "#000"] }]
        }
    }]);
    let canvas = json!({ "type": "custom", "width": 600, "height": 400 });
    let mut editor = editor_with(&widgets, Some(&canvas));

    let outcome = RestorationEngine::new().run(&mut editor).unwrap();

    assert_eq!(outcome, RestoreOutcome::SessionRestoreApplied { restored: 1, skipped: 0 });
    assert_eq!(editor.canvas().rendered(), PixelSize { width: 600, height: 400 });
    let widget = editor.widgets().iter().next().unwrap();
    assert_eq!(widget.kind, ChartType::Bar);
    assert_eq!(widget.geometry.left, 40.0);
    assert_eq!(widget.geometry.top, 60.0);
    let chart = widget.chart.as_ref().unwrap();
    assert_eq!(chart.title, "Sales");
    assert_eq!(chart.series_name, "Q1");
    let rows: Vec<(&str, f64, &str)> =
        chart.points.iter().map(|p| (p.label.as_str(), p.value, p.fill.as_str())).collect();
    assert_eq!(rows, vec![("Item 1", 10.0, "#fff"), ("Item 2", 20.0, "#000")]);

    let stored = store::read_widget_list(editor.session().store()).unwrap();
    let config = &stored.widgets[0].config;
    assert_eq!(config.x_axis_data, vec!["Item 1".to_string(), "Item 2".to_string()]);
    assert_eq!(config.series_data[0].data, vec![10.0, 20.0]);
}

#[test]
fn failed_mount_skips_only_that_widget() {
    let widgets = json!([
        { "id": "a", "type": "bar", "config": {} },
        { "id": "b", "type": "line", "config": {} },
        { "id": "c", "type": "pie", "config": {} }
    ]);
    let mut store = MemoryStore::new();
    store.set(WIDGET_LIST_KEY, widgets.to_string());
    let mut editor = Editor::new(store, Box::new(RejectingSurface { reject: "b" }));

    let outcome = RestorationEngine::new().run(&mut editor).unwrap();

    assert_eq!(outcome, RestoreOutcome::SessionRestoreApplied { restored: 2, skipped: 1 });
    let order: Vec<&str> = editor.widgets().sorted_by_z().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(order, vec!["a", "c"]);
    let stored = store::read_widget_list(editor.session().store()).unwrap();
    let ids: Vec<Option<&str>> = stored.widgets.iter().map(|w| w.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("a"), Some("c")]);
}

#[test]
fn restored_view_is_persisted_back() {
    let widgets = json!([{ "type": "line", "config": {} }]);
    let mut editor = editor_with(&widgets, None);
    RestorationEngine::new().run(&mut editor).unwrap();

    let stored = store::read_widget_list(editor.session().store()).unwrap();
    assert_eq!(stored.widgets.len(), 1);
    assert!(stored.widgets[0].id.is_some());
    assert_eq!(store::read_canvas_size(editor.session().store()).unwrap(), Some(CanvasSize::A4));
}

#[test]
fn restoration_preserves_array_order_in_z_index() {
    let widgets = json!([
        { "id": "a", "type": "bar", "config": {} },
        { "id": "b", "type": "line", "config": {} },
        { "id": "c", "type": "pie", "config": {} }
    ]);
    let mut editor = editor_with(&widgets, None);
    RestorationEngine::new().run(&mut editor).unwrap();

    let order: Vec<&str> = editor.widgets().sorted_by_z().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

#[test]
fn server_load_flag_skips_store_entirely() {
    let mut store = CountingStore::default();
    store.set(WIDGET_LIST_KEY, json!([{ "type": "bar", "config": {} }]).to_string());
    let mut editor = Editor::headless(store);
    editor.session_mut().mark_server_load();

    let outcome = RestorationEngine::new().run(&mut editor).unwrap();

    assert_eq!(outcome, RestoreOutcome::ServerLoadApplied);
    assert_eq!(editor.session().store().reads.get(), 0);
    assert!(!editor.session().is_server_load());
    assert!(editor.widgets().is_empty());
}

#[test]
fn server_load_then_restore_keeps_server_widgets() {
    let mut editor = Editor::headless(MemoryStore::new());
    let set: SnapshotSet = serde_json::from_value(json!({
        "widgets": [{ "id": "srv", "type": "pie", "config": {} }],
        "canvasSize": { "type": "custom", "width": 700, "height": 500 }
    }))
    .unwrap();
    editor.load_server_snapshot(&set).unwrap();

    let outcome = RestorationEngine::new().run(&mut editor).unwrap();
    assert_eq!(outcome, RestoreOutcome::ServerLoadApplied);
    assert!(editor.widgets().contains(&WidgetId::new("srv")));
    assert_eq!(editor.canvas().rendered(), PixelSize { width: 700, height: 500 });
}

#[test]
fn empty_store_applies_default_preset() {
    let mut editor = Editor::headless(MemoryStore::new());
    let outcome = RestorationEngine::new().run(&mut editor).unwrap();
    assert_eq!(outcome, RestoreOutcome::DefaultApplied);
    assert_eq!(editor.canvas().read(), CanvasSize::A4);
    assert!(editor.widgets().is_empty());
}

#[test]
fn empty_widget_list_ignores_stored_canvas() {
    let mut editor = editor_with(&json!([]), Some(&json!({ "type": "a3" })));
    let outcome = RestorationEngine::new().run(&mut editor).unwrap();
    assert_eq!(outcome, RestoreOutcome::DefaultApplied);
    assert_eq!(editor.canvas().read(), CanvasSize::A4);
}

#[test]
fn malformed_widget_list_is_removed_and_defaults_apply() {
    let mut store = MemoryStore::new();
    store.set(WIDGET_LIST_KEY, "{not json".into());
    let mut editor = Editor::headless(store);

    let outcome = RestorationEngine::new().run(&mut editor).unwrap();

    assert_eq!(outcome, RestoreOutcome::DefaultApplied);
    assert!(editor.session().store().get(WIDGET_LIST_KEY).is_none());
}

#[test]
fn malformed_canvas_size_falls_back_to_default_preset() {
    let widgets = json!([{ "type": "bar", "config": {} }]);
    let mut editor = editor_with(&widgets, Some(&json!({ "type": "letter" })));

    let outcome = RestorationEngine::new().run(&mut editor).unwrap();

    assert_eq!(outcome, RestoreOutcome::SessionRestoreApplied { restored: 1, skipped: 0 });
    assert_eq!(editor.canvas().read(), CanvasSize::A4);
    assert_eq!(store::read_canvas_size(editor.session().store()).unwrap(), Some(CanvasSize::A4));
}

#[test]
fn undecodable_entries_are_counted_as_skipped() {
    let widgets = json!([{ "type": "bar", "config": {} }, { "type": "gauge", "config": {} }]);
    let mut editor = editor_with(&widgets, None);
    let outcome = RestorationEngine::new().run(&mut editor).unwrap();
    assert_eq!(outcome, RestoreOutcome::SessionRestoreApplied { restored: 1, skipped: 1 });
}

#[test]
fn second_run_is_rejected() {
    let mut editor = Editor::headless(MemoryStore::new());
    let mut engine = RestorationEngine::new();
    engine.run(&mut editor).unwrap();
    assert_eq!(engine.state(), RestoreState::Idle);
    assert!(matches!(engine.run(&mut editor), Err(RestoreError::AlreadyRan)));
}
