//! Dashboard service: CRUD over the `dashboards` table.
//!
//! DESIGN
//! ======
//! Each dashboard row stores its full snapshot set as JSONB. Updates replace
//! the whole set, so concurrent saves resolve last-write-wins. Thumbnails are
//! stored as the data URL the client generated.
//!
//! Input validation lives in pure functions so routes can reject bad bodies
//! before touching the pool.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::api::{DashboardRecord, DashboardSummary};
use crate::snapshot::SnapshotSet;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("dashboard not found: {0}")]
    NotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for DashboardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_DASHBOARD_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)))
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trimmed dashboard name.
///
/// # Errors
///
/// Returns [`DashboardError::Invalid`] for blank names.
pub fn validate_name(raw: &str) -> Result<String, DashboardError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DashboardError::Invalid("dashboard name is required".into()));
    }
    Ok(name.to_string())
}

/// Thumbnail payloads must be non-empty image data URLs.
///
/// # Errors
///
/// Returns [`DashboardError::Invalid`] for blank or non-image payloads.
pub fn validate_image_data(raw: &str) -> Result<(), DashboardError> {
    let data = raw.trim();
    if data.is_empty() {
        return Err(DashboardError::Invalid("image data is required".into()));
    }
    if !data.starts_with("data:image/") {
        return Err(DashboardError::Invalid("image data must be a data:image URL".into()));
    }
    Ok(())
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a dashboard.
///
/// # Errors
///
/// Returns [`DashboardError::Invalid`] for a blank name, or a database error.
pub async fn create_dashboard(pool: &PgPool, name: &str, data: &SnapshotSet) -> Result<Uuid, DashboardError> {
    let name = validate_name(name)?;
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO dashboards (id, name, data) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(&name)
        .bind(Json(data))
        .execute(pool)
        .await?;

    info!(%id, %name, widgets = data.widgets.len(), "dashboard created");
    Ok(id)
}

/// List dashboards, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_dashboards(pool: &PgPool) -> Result<Vec<DashboardSummary>, DashboardError> {
    let rows = sqlx::query_as::<_, (Uuid, String, bool)>(
        "SELECT id, name, thumbnail IS NOT NULL
         FROM dashboards
         ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, has_thumbnail)| DashboardSummary { id, name, has_thumbnail })
        .collect())
}

/// Load one dashboard with its snapshot set.
///
/// # Errors
///
/// Returns [`DashboardError::NotFound`] if no row matches, or a database error.
pub async fn get_dashboard(pool: &PgPool, id: Uuid) -> Result<DashboardRecord, DashboardError> {
    let row = sqlx::query_as::<_, (Uuid, String, Json<SnapshotSet>)>(
        "SELECT id, name, data FROM dashboards WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let (id, name, Json(data)) = row.ok_or(DashboardError::NotFound(id))?;
    Ok(DashboardRecord { id, name, data })
}

/// Replace a dashboard's snapshot set.
///
/// # Errors
///
/// Returns [`DashboardError::NotFound`] if no row matches, or a database error.
pub async fn update_dashboard(pool: &PgPool, id: Uuid, data: &SnapshotSet) -> Result<(), DashboardError> {
    let result = sqlx::query("UPDATE dashboards SET data = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(Json(data))
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DashboardError::NotFound(id));
    }
    info!(%id, widgets = data.widgets.len(), "dashboard updated");
    Ok(())
}

/// Delete a dashboard.
///
/// # Errors
///
/// Returns [`DashboardError::NotFound`] if no row matches, or a database error.
pub async fn delete_dashboard(pool: &PgPool, id: Uuid) -> Result<(), DashboardError> {
    let result = sqlx::query("DELETE FROM dashboards WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DashboardError::NotFound(id));
    }
    info!(%id, "dashboard deleted");
    Ok(())
}

/// Store a thumbnail data URL.
///
/// # Errors
///
/// Returns [`DashboardError::Invalid`] for bad payloads,
/// [`DashboardError::NotFound`] if no row matches, or a database error.
pub async fn set_thumbnail(pool: &PgPool, id: Uuid, image_data: &str) -> Result<(), DashboardError> {
    validate_image_data(image_data)?;
    let result = sqlx::query("UPDATE dashboards SET thumbnail = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(image_data.trim())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DashboardError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
