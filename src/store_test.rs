use serde_json::json;

use super::*;
use crate::snapshot::{ChartConfig, ChartType};

fn store_with(key: &str, value: &str) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.set(key, value.to_string());
    store
}

#[test]
fn missing_keys_read_as_empty() {
    let store = MemoryStore::new();
    assert_eq!(read_widget_list(&store).unwrap(), WidgetList::default());
    assert_eq!(read_canvas_size(&store).unwrap(), None);
}

#[test]
fn widget_list_must_be_array() {
    let store = store_with(WIDGET_LIST_KEY, r#"{"type":"bar"}"#);
    let err = read_widget_list(&store).unwrap_err();
    assert!(matches!(err, StoreError::Malformed { key: WIDGET_LIST_KEY, .. }));
}

#[test]
fn unparseable_widget_list_is_malformed() {
    let store = store_with(WIDGET_LIST_KEY, "[{");
    assert!(read_widget_list(&store).is_err());
}

#[test]
fn bad_entries_are_skipped_and_counted() {
    let raw = json!([
        { "type": "bar", "config": {} },
        { "type": "radar", "config": {} },
        "garbage",
        { "type": "pie", "config": {} }
    ])
    .to_string();
    let store = store_with(WIDGET_LIST_KEY, &raw);
    let list = read_widget_list(&store).unwrap();
    assert_eq!(list.widgets.len(), 2);
    assert_eq!(list.skipped, 2);
    assert_eq!(list.widgets[1].chart_type, ChartType::Pie);
}

#[test]
fn malformed_canvas_size_is_reported() {
    let store = store_with(CANVAS_SIZE_KEY, r#"{"type":"letter"}"#);
    assert!(matches!(read_canvas_size(&store), Err(StoreError::Malformed { key: CANVAS_SIZE_KEY, .. })));
}

#[test]
fn write_then_read_returns_same_set() {
    let set = SnapshotSet {
        widgets: vec![WidgetSnapshot::partial(ChartType::Line, ChartConfig::default())],
        canvas_size: CanvasSize::Custom { width: 600, height: 400 },
    };
    let mut store = MemoryStore::new();
    write_snapshot_set(&mut store, &set).unwrap();
    assert_eq!(read_widget_list(&store).unwrap().widgets, set.widgets);
    assert_eq!(read_canvas_size(&store).unwrap(), Some(set.canvas_size));
}

#[test]
fn write_is_idempotent() {
    let set = SnapshotSet::default();
    let mut store = MemoryStore::new();
    write_snapshot_set(&mut store, &set).unwrap();
    let first = (store.get(WIDGET_LIST_KEY), store.get(CANVAS_SIZE_KEY));
    write_snapshot_set(&mut store, &set).unwrap();
    assert_eq!((store.get(WIDGET_LIST_KEY), store.get(CANVAS_SIZE_KEY)), first);
    assert_eq!(store.len(), 2);
}

#[test]
fn clear_removes_both_keys() {
    let mut store = MemoryStore::new();
    write_snapshot_set(&mut store, &SnapshotSet::default()).unwrap();
    store.set("unrelated", "keep".into());
    clear(&mut store);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("unrelated").as_deref(), Some("keep"));
}

#[test]
fn server_load_flag_is_consumed_once() {
    let mut session = Session::new(MemoryStore::new());
    assert!(!session.take_server_load());
    session.mark_server_load();
    assert!(session.is_server_load());
    assert!(session.take_server_load());
    assert!(!session.take_server_load());
}
