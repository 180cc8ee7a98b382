#![allow(clippy::float_cmp)]

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::*;
use crate::chart::EditRow;
use crate::consts::{CANVAS_SIZE_KEY, WIDGET_LIST_KEY};
use crate::store::MemoryStore;
use crate::widget::Widget;

/// Surface that records every call.
#[derive(Clone, Default)]
struct RecordingSurface {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingSurface {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChartSurface for RecordingSurface {
    fn mount(&mut self, widget: &Widget) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(format!("mount {}", widget.id));
        Ok(())
    }

    fn sync(&mut self, widget: &Widget) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(format!("sync {}", widget.id));
        Ok(())
    }

    fn unmount(&mut self, id: &WidgetId) {
        self.calls.lock().unwrap().push(format!("unmount {id}"));
    }
}

fn recording_editor() -> (Editor<MemoryStore>, RecordingSurface) {
    let surface = RecordingSurface::default();
    (Editor::new(MemoryStore::new(), Box::new(surface.clone())), surface)
}

fn stored_widget_count(editor: &Editor<MemoryStore>) -> usize {
    store::read_widget_list(editor.session().store()).unwrap().widgets.len()
}

#[test]
fn add_chart_places_default_geometry_and_persists() {
    let (mut editor, surface) = recording_editor();
    let id = editor.add_chart(ChartType::Bar, ChartConfig::default()).unwrap();
    let widget = editor.widgets().get(&id).unwrap();
    assert_eq!(widget.geometry.left, 20.0);
    assert_eq!(widget.geometry.width, 200.0);
    assert_eq!(stored_widget_count(&editor), 1);
    assert_eq!(surface.calls(), vec![format!("mount {id}")]);
}

#[test]
fn delete_widget_unmounts_and_persists() {
    let (mut editor, surface) = recording_editor();
    let id = editor.add_chart(ChartType::Line, ChartConfig::default()).unwrap();
    editor.delete_widget(&id).unwrap();
    assert!(editor.widgets().is_empty());
    assert_eq!(stored_widget_count(&editor), 0);
    assert!(surface.calls().contains(&format!("unmount {id}")));
}

#[test]
fn delete_unknown_widget_is_an_error() {
    let mut editor = Editor::headless(MemoryStore::new());
    let err = editor.delete_widget(&WidgetId::new("ghost")).unwrap_err();
    assert!(matches!(err, EditorError::WidgetNotFound(_)));
    assert_eq!(err.error_code(), "E_WIDGET_NOT_FOUND");
}

#[test]
fn customize_updates_chart_and_persists() {
    let (mut editor, surface) = recording_editor();
    let id = editor.add_chart(ChartType::Bar, ChartConfig::default()).unwrap();
    let edit = ChartEdit {
        title: "Sales".into(),
        rows: vec![EditRow { label: "Q1".into(), value: 3.0, color: "#ff0000".into() }],
        ..ChartEdit::default()
    };
    editor.customize(&id, edit).unwrap();

    let stored = store::read_widget_list(editor.session().store()).unwrap();
    let config = &stored.widgets[0].config;
    assert_eq!(config.title, "Sales");
    assert_eq!(config.x_axis_data, vec!["Q1".to_string()]);
    assert_eq!(config.series_data[0].data, vec![3.0]);
    assert!(surface.calls().contains(&format!("sync {id}")));
}

#[test]
fn select_preset_persists_canvas_size() {
    let mut editor = Editor::headless(MemoryStore::new());
    assert_eq!(editor.select_canvas_size(SizeOption::A3).unwrap(), Some(CanvasSize::A3));
    assert_eq!(store::read_canvas_size(editor.session().store()).unwrap(), Some(CanvasSize::A3));
}

#[test]
fn select_custom_does_not_persist_until_dimensions_apply() {
    let mut editor = Editor::headless(MemoryStore::new());
    assert_eq!(editor.select_canvas_size(SizeOption::Custom).unwrap(), None);
    assert!(editor.session().store().get(CANVAS_SIZE_KEY).is_none());

    assert_eq!(editor.set_custom_canvas_size("abc", "400").unwrap(), None);
    assert!(editor.session().store().get(CANVAS_SIZE_KEY).is_none());

    let applied = editor.set_custom_canvas_size("600", "400").unwrap();
    assert_eq!(applied, Some(CanvasSize::Custom { width: 600, height: 400 }));
    assert_eq!(store::read_canvas_size(editor.session().store()).unwrap(), applied);
}

#[test]
fn capture_follows_insertion_order() {
    let mut editor = Editor::headless(MemoryStore::new());
    let a = editor.add_chart(ChartType::Bar, ChartConfig::default()).unwrap();
    let b = editor.add_chart(ChartType::Pie, ChartConfig::default()).unwrap();
    let set = editor.capture();
    let ids: Vec<Option<String>> = set.widgets.iter().map(|w| w.id.clone()).collect();
    assert_eq!(ids, vec![Some(a.to_string()), Some(b.to_string())]);
    assert_eq!(set.canvas_size, CanvasSize::A4);
}

#[test]
fn materialize_skip_mode_does_not_touch_store() {
    let mut editor = Editor::headless(MemoryStore::new());
    let snap = WidgetSnapshot::partial(ChartType::Bar, ChartConfig::default());
    editor.materialize(&snap, SaveMode::Skip).unwrap();
    assert!(editor.session().store().is_empty());
    editor.materialize(&snap, SaveMode::Persist).unwrap();
    assert_eq!(stored_widget_count(&editor), 2);
}

#[test]
fn load_server_snapshot_replaces_canvas_and_sets_flag() {
    let (mut editor, surface) = recording_editor();
    let old = editor.add_chart(ChartType::Line, ChartConfig::default()).unwrap();

    let set: SnapshotSet = serde_json::from_value(json!({
        "widgets": [{ "id": "s1", "type": "bar", "config": { "title": "Server" } }],
        "canvasSize": { "type": "a3" }
    }))
    .unwrap();

    let report = editor.load_server_snapshot(&set).unwrap();
    assert_eq!(report.restored, 1);
    assert!(surface.calls().contains(&format!("unmount {old}")));
    assert_eq!(editor.widgets().len(), 1);
    assert!(editor.widgets().contains(&WidgetId::new("s1")));
    assert_eq!(editor.canvas().read(), CanvasSize::A3);
    assert!(editor.session().is_server_load());
    assert_eq!(stored_widget_count(&editor), 1);
}

#[test]
fn clear_session_removes_cached_keys() {
    let mut editor = Editor::headless(MemoryStore::new());
    editor.add_chart(ChartType::Bar, ChartConfig::default()).unwrap();
    assert!(editor.session().store().get(WIDGET_LIST_KEY).is_some());
    editor.clear_session();
    assert!(editor.session().store().is_empty());
    assert_eq!(editor.widgets().len(), 1);
}
