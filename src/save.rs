//! Save orchestrator.
//!
//! DESIGN
//! ======
//! Local persistence is synchronous and happens on every layout change:
//! [`capture_current_state`] reads the arena and canvas negotiator, and
//! [`persist_locally`] overwrites both store keys.
//!
//! Remote persistence is explicit and split in two:
//! - [`SaveOrchestrator::prepare`] validates, captures, persists locally, and
//!   returns an owned [`SaveRequest`]. Nothing is awaited, so the captured
//!   state is exactly what the user saw when they clicked save.
//! - [`SaveOrchestrator::submit`] performs the network call behind a
//!   single-flight guard keyed by dashboard id (or [`FlightKey::Unsaved`] for
//!   creates). A submit that finds its key busy is parked and returns
//!   [`SaveOutcome::Queued`]; the leader sends the parked request once its
//!   own request succeeds. After a create the flight is re-keyed to the new
//!   id and the parked request is sent as an update.
//!
//! [`SaveOrchestrator::open`] goes the other way: it fetches a server record,
//! loads it through [`Editor::load_server_snapshot`], and adopts its id.
//!
//! ERROR HANDLING
//! ==============
//! Network failures alert the user and leave the local cache untouched. When
//! the leader's request fails, any parked request is dropped and logged.

#[cfg(test)]
#[path = "save_test.rs"]
mod save_test;

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::api::{ApiError, DashboardApi, DashboardId, DashboardSummary};
use crate::canvas_size::CanvasSizeNegotiator;
use crate::editor::{Editor, EditorError, MaterializeReport};
use crate::error::ErrorCode;
use crate::flight::{FlightGuard, SingleFlight};
use crate::serializer::serialize;
use crate::snapshot::SnapshotSet;
use crate::store::{self, SnapshotStore, StoreError};
use crate::widget::WidgetArena;

// =============================================================================
// LOCAL PERSISTENCE
// =============================================================================

/// Capture every widget in insertion order plus the live canvas size.
#[must_use]
pub fn capture_current_state(widgets: &WidgetArena, canvas: &CanvasSizeNegotiator) -> SnapshotSet {
    SnapshotSet { widgets: widgets.iter().map(serialize).collect(), canvas_size: canvas.read() }
}

/// Overwrite both store keys with `set`. Idempotent.
///
/// # Errors
///
/// Returns a [`StoreError`] if encoding fails.
pub fn persist_locally(store: &mut dyn SnapshotStore, set: &SnapshotSet) -> Result<(), StoreError> {
    store::write_snapshot_set(store, set)
}

// =============================================================================
// FEEDBACK
// =============================================================================

/// Input fields the orchestrator may direct focus to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DashboardName,
}

/// User-facing notifications.
pub trait Feedback: Send + Sync {
    fn alert(&self, message: &str);
    fn focus(&self, field: Field);
}

/// Feedback sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn alert(&self, message: &str) {
        info!(message, "alert");
    }

    fn focus(&self, field: Field) {
        debug!(?field, "focus");
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// Single-flight key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightKey {
    Unsaved,
    Dashboard(DashboardId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Create { name: String },
    Update { id: DashboardId },
}

/// An owned, fully captured save ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub target: SaveTarget,
    pub set: SnapshotSet,
}

impl SaveRequest {
    #[must_use]
    pub fn key(&self) -> FlightKey {
        match self.target {
            SaveTarget::Create { .. } => FlightKey::Unsaved,
            SaveTarget::Update { id } => FlightKey::Dashboard(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created { id: DashboardId },
    Updated { id: DashboardId },
    /// Parked behind an in-flight save; it will be sent when that one lands.
    Queued,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("dashboard name is required")]
    MissingName,
    #[error("dashboard has not been saved yet")]
    NotSaved,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl ErrorCode for SaveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingName => "E_MISSING_NAME",
            Self::NotSaved => "E_NOT_SAVED",
            Self::Store(e) => e.error_code(),
            Self::Api(e) => e.error_code(),
            Self::Editor(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Api(e) if e.retryable())
    }
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

type Flight<'a> = FlightGuard<'a, FlightKey, SaveRequest>;

pub struct SaveOrchestrator {
    api: Arc<dyn DashboardApi>,
    feedback: Arc<dyn Feedback>,
    identity: Mutex<Option<DashboardId>>,
    flights: SingleFlight<FlightKey, SaveRequest>,
}

impl SaveOrchestrator {
    #[must_use]
    pub fn new(api: Arc<dyn DashboardApi>, feedback: Arc<dyn Feedback>) -> Self {
        Self { api, feedback, identity: Mutex::new(None), flights: SingleFlight::new() }
    }

    /// Bind to an existing server dashboard; later saves become updates.
    pub fn adopt(&self, id: DashboardId) {
        self.set_identity(Some(id));
    }

    /// Id of the server dashboard being edited, if it has one.
    #[must_use]
    pub fn identity(&self) -> Option<DashboardId> {
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_identity(&self, id: Option<DashboardId>) {
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner) = id;
    }

    /// Validate, capture, and persist locally. No network I/O.
    ///
    /// `name` is only consulted when the dashboard has no server id yet.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::MissingName`] for a create with a blank name (the
    /// user is alerted and the name field focused), or a store error.
    pub fn prepare<S: SnapshotStore>(&self, editor: &mut Editor<S>, name: &str) -> Result<SaveRequest, SaveError> {
        let target = match self.identity() {
            Some(id) => SaveTarget::Update { id },
            None => {
                let name = name.trim();
                if name.is_empty() {
                    self.feedback.alert("Please enter a dashboard name.");
                    self.feedback.focus(Field::DashboardName);
                    return Err(SaveError::MissingName);
                }
                SaveTarget::Create { name: name.to_string() }
            }
        };
        let set = editor.persist_locally()?;
        Ok(SaveRequest { target, set })
    }

    /// Send a prepared request, coalescing with any in-flight save.
    ///
    /// A create prepared before the dashboard got its id is sent as an update.
    /// Dropping the returned future releases the flight.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Api`] if this caller's own request fails. Failures
    /// of parked requests sent afterwards are alerted and logged only.
    pub async fn submit(&self, request: SaveRequest) -> Result<SaveOutcome, SaveError> {
        let request = self.retarget(request);
        let key = request.key();
        let Some((mut flight, request)) = self.flights.lead(key, request) else {
            debug!(?key, "save parked behind in-flight request");
            return Ok(SaveOutcome::Queued);
        };

        let outcome = match self.send(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail_flight(flight, &e);
                return Err(e);
            }
        };
        self.feedback.alert("Dashboard saved successfully!");
        self.settle(&mut flight, outcome);

        while let Some(pending) = flight.next() {
            let pending = self.retarget(pending);
            match self.send(pending).await {
                Ok(next) => self.settle(&mut flight, next),
                Err(e) => {
                    self.fail_flight(flight, &e);
                    break;
                }
            }
        }

        Ok(outcome)
    }

    /// `prepare` followed by `submit`.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare`] and [`Self::submit`].
    pub async fn save<S: SnapshotStore>(&self, editor: &mut Editor<S>, name: &str) -> Result<SaveOutcome, SaveError> {
        let request = self.prepare(editor, name)?;
        self.submit(request).await
    }

    /// Fetch a saved dashboard, load it into the editor, and adopt its id.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Api`] if the fetch fails (the user is alerted and
    /// the editor is untouched), or [`SaveError::Editor`] if the local persist
    /// after loading fails.
    pub async fn open<S: SnapshotStore>(
        &self,
        editor: &mut Editor<S>,
        id: DashboardId,
    ) -> Result<MaterializeReport, SaveError> {
        let record = match self.api.fetch(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(dashboard_id = %id, error = %e, code = e.error_code(), "dashboard fetch failed");
                self.feedback.alert(&format!("Error loading dashboard: {e}"));
                return Err(e.into());
            }
        };
        let report = editor.load_server_snapshot(&record.data)?;
        self.adopt(id);
        info!(dashboard_id = %id, name = %record.name, restored = report.restored, "dashboard opened");
        Ok(report)
    }

    /// Saved dashboards on the server.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Api`] if the request fails; the user is alerted.
    pub async fn list_remote(&self) -> Result<Vec<DashboardSummary>, SaveError> {
        match self.api.list().await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                self.feedback.alert(&format!("Error loading dashboards: {e}"));
                Err(e.into())
            }
        }
    }

    /// Delete the adopted dashboard on the server.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::NotSaved`] without an id, or the API error.
    pub async fn delete_remote(&self) -> Result<(), SaveError> {
        let id = self.identity().ok_or(SaveError::NotSaved)?;
        if let Err(e) = self.api.delete(id).await {
            self.feedback.alert(&format!("Error deleting dashboard: {e}"));
            return Err(e.into());
        }
        self.set_identity(None);
        info!(dashboard_id = %id, "dashboard deleted");
        Ok(())
    }

    /// Upload an already generated thumbnail for the adopted dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::NotSaved`] without an id, or the API error.
    pub async fn upload_thumbnail(&self, image_data: &str) -> Result<(), SaveError> {
        let id = self.identity().ok_or(SaveError::NotSaved)?;
        self.api.upload_thumbnail(id, image_data).await?;
        debug!(dashboard_id = %id, "thumbnail uploaded");
        Ok(())
    }

    async fn send(&self, request: SaveRequest) -> Result<SaveOutcome, SaveError> {
        match request.target {
            SaveTarget::Create { name } => {
                let id = self.api.create(&name, &request.set).await?;
                info!(dashboard_id = %id, widgets = request.set.widgets.len(), "dashboard created");
                Ok(SaveOutcome::Created { id })
            }
            SaveTarget::Update { id } => {
                self.api.update(id, &request.set).await?;
                info!(dashboard_id = %id, widgets = request.set.widgets.len(), "dashboard updated");
                Ok(SaveOutcome::Updated { id })
            }
        }
    }

    /// Record a successful send; a create moves the flight to the new id.
    fn settle(&self, flight: &mut Flight<'_>, outcome: SaveOutcome) {
        if let SaveOutcome::Created { id } = outcome {
            self.set_identity(Some(id));
            flight.rekey(FlightKey::Dashboard(id));
        }
    }

    /// Creates become updates once the dashboard has an id.
    fn retarget(&self, mut request: SaveRequest) -> SaveRequest {
        if matches!(request.target, SaveTarget::Create { .. })
            && let Some(id) = self.identity()
        {
            request.target = SaveTarget::Update { id };
        }
        request
    }

    fn fail_flight(&self, flight: Flight<'_>, error: &SaveError) {
        let key = flight.key().copied();
        if let Some(dropped) = flight.abandon() {
            warn!(?key, widgets = dropped.set.widgets.len(), "dropping parked save after failure");
        }
        warn!(?key, error = %error, code = error.error_code(), "dashboard save failed");
        self.feedback.alert(&format!("Error saving dashboard: {error}"));
    }
}
