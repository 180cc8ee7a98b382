//! Dashboard REST routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::warn;
use uuid::Uuid;

use crate::api::{CreateDashboardBody, CreatedResponse, DashboardRecord, DashboardSummary, MessageResponse, ThumbnailBody};
use crate::services::dashboard::{self, DashboardError};
use crate::snapshot::SnapshotSet;
use crate::state::AppState;

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse { message: text.to_string() })
}

/// `POST /api/dashboards`: create a dashboard.
pub async fn create_dashboard(
    State(state): State<AppState>,
    Json(body): Json<CreateDashboardBody>,
) -> Result<(StatusCode, Json<CreatedResponse>), StatusCode> {
    let id = dashboard::create_dashboard(&state.pool, &body.name, &body.data)
        .await
        .map_err(dashboard_error_to_status)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { message: "Dashboard saved successfully".into(), dashboard_id: id }),
    ))
}

/// `GET /api/dashboards`: list dashboards.
pub async fn list_dashboards(State(state): State<AppState>) -> Result<Json<Vec<DashboardSummary>>, StatusCode> {
    let rows = dashboard::list_dashboards(&state.pool)
        .await
        .map_err(dashboard_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/dashboards/{id}`: fetch one dashboard with its snapshot set.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardRecord>, StatusCode> {
    let record = dashboard::get_dashboard(&state.pool, id)
        .await
        .map_err(dashboard_error_to_status)?;
    Ok(Json(record))
}

/// `PUT /api/dashboards/{id}`: replace the snapshot set.
pub async fn update_dashboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SnapshotSet>,
) -> Result<Json<MessageResponse>, StatusCode> {
    dashboard::update_dashboard(&state.pool, id, &body)
        .await
        .map_err(dashboard_error_to_status)?;
    Ok(message("Dashboard updated successfully"))
}

/// `DELETE /api/dashboards/{id}`: delete a dashboard.
pub async fn delete_dashboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, StatusCode> {
    dashboard::delete_dashboard(&state.pool, id)
        .await
        .map_err(dashboard_error_to_status)?;
    Ok(message("Dashboard deleted successfully"))
}

/// `PUT /api/dashboards/{id}/thumbnail`: store a generated thumbnail.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ThumbnailBody>,
) -> Result<Json<MessageResponse>, StatusCode> {
    dashboard::set_thumbnail(&state.pool, id, &body.image_data)
        .await
        .map_err(dashboard_error_to_status)?;
    Ok(message("Thumbnail saved"))
}

pub(crate) fn dashboard_error_to_status(err: DashboardError) -> StatusCode {
    match err {
        DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
        DashboardError::Invalid(_) => StatusCode::BAD_REQUEST,
        DashboardError::Database(e) => {
            warn!(error = %e, "dashboard query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "dashboards_test.rs"]
mod tests;
