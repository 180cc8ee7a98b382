//! Restoration engine.
//!
//! DESIGN
//! ======
//! Runs once when the editor view becomes active and decides what the canvas
//! should show:
//!
//! 1. The session's restoration-source flag is set: a server payload is
//!    already on the canvas. The flag is cleared and the store is not read.
//! 2. The store holds a non-empty widget list: apply the stored canvas size
//!    (default preset when absent), replace the canvas with the stored widgets
//!    in array order, and persist the resulting view.
//! 3. Otherwise: default preset, empty canvas.
//!
//! ```text
//! AwaitingDecision ──flag──────────► ServerLoadApplied ──┐
//!        │ ─────stored widgets─────► SessionRestoreApplied ─┼─► Idle
//!        └─────────otherwise───────► DefaultApplied ───────┘
//! ```
//!
//! ERROR HANDLING
//! ==============
//! Store entries that cannot be decoded are logged, removed, and treated as
//! absent so a corrupt cache never blocks the editor.

#[cfg(test)]
#[path = "restore_test.rs"]
mod restore_test;

use tracing::{info, warn};

use crate::consts::{CANVAS_SIZE_KEY, WIDGET_LIST_KEY};
use crate::editor::{Editor, MaterializeReport};
use crate::snapshot::CanvasSize;
use crate::store::{self, SnapshotStore, StoreError, WidgetList};

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreState {
    #[default]
    AwaitingDecision,
    ServerLoadApplied,
    SessionRestoreApplied,
    DefaultApplied,
    Idle,
}

/// What a restoration pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    ServerLoadApplied,
    SessionRestoreApplied { restored: usize, skipped: usize },
    DefaultApplied,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("restoration already ran for this view")]
    AlreadyRan,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl crate::error::ErrorCode for RestoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyRan => "E_RESTORE_ALREADY_RAN",
            Self::Store(_) => "E_RESTORE_STORE",
        }
    }
}

#[derive(Debug, Default)]
pub struct RestorationEngine {
    state: RestoreState,
}

impl RestorationEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> RestoreState {
        self.state
    }

    /// Decide and apply the initial canvas contents.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreError::AlreadyRan`] on any call after the first, or a
    /// store error if re-persisting a restored view fails.
    pub fn run<S: SnapshotStore>(&mut self, editor: &mut Editor<S>) -> Result<RestoreOutcome, RestoreError> {
        if self.state != RestoreState::AwaitingDecision {
            return Err(RestoreError::AlreadyRan);
        }

        let outcome = if editor.session.take_server_load() {
            info!("server load already applied; skipping session restore");
            RestoreOutcome::ServerLoadApplied
        } else {
            restore_from_store(editor)
        };
        self.state = outcome.state();

        if let RestoreOutcome::SessionRestoreApplied { restored, skipped } = outcome {
            editor.persist_locally()?;
            info!(restored, skipped, "session widgets restored");
        }

        self.state = RestoreState::Idle;
        Ok(outcome)
    }
}

impl RestoreOutcome {
    /// Transient engine state this outcome corresponds to.
    #[must_use]
    pub fn state(self) -> RestoreState {
        match self {
            Self::ServerLoadApplied => RestoreState::ServerLoadApplied,
            Self::SessionRestoreApplied { .. } => RestoreState::SessionRestoreApplied,
            Self::DefaultApplied => RestoreState::DefaultApplied,
        }
    }
}

fn restore_from_store<S: SnapshotStore>(editor: &mut Editor<S>) -> RestoreOutcome {
    let stored = read_widgets(editor);
    if stored.widgets.is_empty() {
        editor.apply_canvas_size(CanvasSize::default());
        info!("no stored widgets; default canvas applied");
        return RestoreOutcome::DefaultApplied;
    }

    let size = read_canvas(editor).unwrap_or_default();
    editor.apply_canvas_size(size);
    editor.clear_widgets();
    let MaterializeReport { restored, skipped } = editor.materialize_all(&stored.widgets);
    RestoreOutcome::SessionRestoreApplied { restored, skipped: skipped + stored.skipped }
}

fn read_widgets<S: SnapshotStore>(editor: &mut Editor<S>) -> WidgetList {
    match store::read_widget_list(editor.session.store()) {
        Ok(list) => list,
        Err(e) => {
            warn!(error = %e, "discarding malformed widget list");
            editor.session.store_mut().remove(WIDGET_LIST_KEY);
            WidgetList::default()
        }
    }
}

fn read_canvas<S: SnapshotStore>(editor: &mut Editor<S>) -> Option<CanvasSize> {
    match store::read_canvas_size(editor.session.store()) {
        Ok(size) => size,
        Err(e) => {
            warn!(error = %e, "discarding malformed canvas size");
            editor.session.store_mut().remove(CANVAS_SIZE_KEY);
            None
        }
    }
}
