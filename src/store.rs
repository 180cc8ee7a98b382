//! Session snapshot store.
//!
//! DESIGN
//! ======
//! The store is a tab-scoped string key-value map holding exactly two keys:
//! [`WIDGET_LIST_KEY`] (JSON array of widget snapshots) and
//! [`CANVAS_SIZE_KEY`] (canvas-size descriptor). It lives inside a
//! [`Session`] together with the restoration-source flag, and the session is
//! owned by the editor rather than being ambient global state.
//!
//! ERROR HANDLING
//! ==============
//! Reads are typed: a key whose value cannot be decoded yields
//! [`StoreError::Malformed`]. Individual widget entries that fail to decode
//! are skipped and counted so one bad entry does not lose the rest.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::consts::{CANVAS_SIZE_KEY, WIDGET_LIST_KEY};
use crate::snapshot::{CanvasSize, SnapshotSet, WidgetSnapshot};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("malformed value under {key}: {reason}")]
    Malformed { key: &'static str, reason: String },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "E_STORE_MALFORMED",
            Self::Encode { .. } => "E_STORE_ENCODE",
        }
    }
}

/// Tab-scoped key-value persistence.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory store. Lives as long as the editing session.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Decoded widget list plus the number of entries that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetList {
    pub widgets: Vec<WidgetSnapshot>,
    pub skipped: usize,
}

// =============================================================================
// TYPED ACCESS
// =============================================================================

/// Read the stored widget list. A missing key is an empty list.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if the value is not a JSON array.
pub fn read_widget_list(store: &dyn SnapshotStore) -> Result<WidgetList, StoreError> {
    let Some(raw) = store.get(WIDGET_LIST_KEY) else {
        return Ok(WidgetList::default());
    };

    let entries = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            return Err(StoreError::Malformed {
                key: WIDGET_LIST_KEY,
                reason: format!("expected array, found {}", json_kind(&other)),
            });
        }
        Err(e) => return Err(StoreError::Malformed { key: WIDGET_LIST_KEY, reason: e.to_string() }),
    };

    let mut list = WidgetList::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<WidgetSnapshot>(entry) {
            Ok(snapshot) => list.widgets.push(snapshot),
            Err(e) => {
                warn!(index, error = %e, "skipping undecodable widget snapshot");
                list.skipped += 1;
            }
        }
    }
    Ok(list)
}

/// Read the stored canvas size. A missing key is `None`.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if the value is not a valid descriptor.
pub fn read_canvas_size(store: &dyn SnapshotStore) -> Result<Option<CanvasSize>, StoreError> {
    let Some(raw) = store.get(CANVAS_SIZE_KEY) else {
        return Ok(None);
    };
    match serde_json::from_str::<CanvasSize>(&raw) {
        Ok(size) => Ok(Some(size)),
        Err(e) => Err(StoreError::Malformed { key: CANVAS_SIZE_KEY, reason: e.to_string() }),
    }
}

/// Overwrite both keys with `set`.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if either value fails to serialize.
pub fn write_snapshot_set(store: &mut dyn SnapshotStore, set: &SnapshotSet) -> Result<(), StoreError> {
    let widgets =
        serde_json::to_string(&set.widgets).map_err(|source| StoreError::Encode { key: WIDGET_LIST_KEY, source })?;
    let canvas =
        serde_json::to_string(&set.canvas_size).map_err(|source| StoreError::Encode { key: CANVAS_SIZE_KEY, source })?;
    store.set(WIDGET_LIST_KEY, widgets);
    store.set(CANVAS_SIZE_KEY, canvas);
    debug!(widgets = set.widgets.len(), "snapshot set persisted locally");
    Ok(())
}

/// Remove both keys.
pub fn clear(store: &mut dyn SnapshotStore) {
    store.remove(WIDGET_LIST_KEY);
    store.remove(CANVAS_SIZE_KEY);
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Session-scoped state: the snapshot store and the restoration-source flag.
#[derive(Debug, Default)]
pub struct Session<S> {
    store: S,
    server_load: bool,
}

impl<S: SnapshotStore> Session<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store, server_load: false }
    }

    /// Record that the current view came from a server payload.
    pub fn mark_server_load(&mut self) {
        self.server_load = true;
    }

    /// Read and reset the restoration-source flag.
    pub fn take_server_load(&mut self) -> bool {
        std::mem::take(&mut self.server_load)
    }

    #[must_use]
    pub fn is_server_load(&self) -> bool {
        self.server_load
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
