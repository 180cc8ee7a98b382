//! Remote dashboard API client.
//!
//! [`DashboardApi`] is the async seam the save orchestrator talks to;
//! [`HttpDashboardApi`] is the `reqwest` implementation against the routes in
//! [`crate::routes::dashboards`]. Response parsing is split into pure
//! functions so it can be tested without a server.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::snapshot::SnapshotSet;

/// Server-assigned dashboard identifier.
pub type DashboardId = Uuid;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("API response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_API_REQUEST",
            Self::Response { .. } => "E_API_RESPONSE",
            Self::Parse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Body of `POST /api/dashboards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDashboardBody {
    pub name: String,
    #[serde(flatten)]
    pub data: SnapshotSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub dashboard_id: DashboardId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One row of `GET /api/dashboards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub id: DashboardId,
    pub name: String,
    pub has_thumbnail: bool,
}

/// Body of `GET /api/dashboards/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRecord {
    pub id: DashboardId,
    pub name: String,
    pub data: SnapshotSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailBody {
    pub image_data: String,
}

// =============================================================================
// TRAIT
// =============================================================================

/// Remote dashboard persistence. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// Create a dashboard and return its server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the server rejects it.
    async fn create(&self, name: &str, set: &SnapshotSet) -> Result<DashboardId, ApiError>;

    /// Replace the stored snapshot of an existing dashboard.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the server rejects it.
    async fn update(&self, id: DashboardId, set: &SnapshotSet) -> Result<(), ApiError>;

    /// Delete a dashboard.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the server rejects it.
    async fn delete(&self, id: DashboardId) -> Result<(), ApiError>;

    /// List saved dashboards.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is malformed.
    async fn list(&self) -> Result<Vec<DashboardSummary>, ApiError>;

    /// Fetch one dashboard with its snapshot set.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is malformed.
    async fn fetch(&self, id: DashboardId) -> Result<DashboardRecord, ApiError>;

    /// Attach an already generated thumbnail image (data URL).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the server rejects it.
    async fn upload_thumbnail(&self, id: DashboardId, image_data: &str) -> Result<(), ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpDashboardApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDashboardApi {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend cannot start.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        check_status(status, text)
    }
}

#[async_trait::async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn create(&self, name: &str, set: &SnapshotSet) -> Result<DashboardId, ApiError> {
        let body = CreateDashboardBody { name: name.to_string(), data: set.clone() };
        let text = self.send(self.http.post(self.url("/api/dashboards")).json(&body)).await?;
        Ok(parse_json::<CreatedResponse>(&text)?.dashboard_id)
    }

    async fn update(&self, id: DashboardId, set: &SnapshotSet) -> Result<(), ApiError> {
        self.send(self.http.put(self.url(&format!("/api/dashboards/{id}"))).json(set)).await?;
        Ok(())
    }

    async fn delete(&self, id: DashboardId) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url(&format!("/api/dashboards/{id}")))).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DashboardSummary>, ApiError> {
        let text = self.send(self.http.get(self.url("/api/dashboards"))).await?;
        parse_json(&text)
    }

    async fn fetch(&self, id: DashboardId) -> Result<DashboardRecord, ApiError> {
        let text = self.send(self.http.get(self.url(&format!("/api/dashboards/{id}")))).await?;
        parse_json(&text)
    }

    async fn upload_thumbnail(&self, id: DashboardId, image_data: &str) -> Result<(), ApiError> {
        let body = ThumbnailBody { image_data: image_data.to_string() };
        self.send(self.http.put(self.url(&format!("/api/dashboards/{id}/thumbnail"))).json(&body))
            .await?;
        Ok(())
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn check_status(status: u16, body: String) -> Result<String, ApiError> {
    if (200..300).contains(&status) { Ok(body) } else { Err(ApiError::Response { status, body }) }
}

fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
