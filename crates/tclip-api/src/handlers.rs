//! Request handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use tclip_collector::{ChromeSession, ClipLocator};
use tclip_models::RunReport;
use tclip_pipeline::PipelineError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Collection request payload.
#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    /// Profile to collect clips for
    pub username: String,
    /// How many clips to collect (defaults from config)
    pub num_clips: Option<usize>,
}

/// Profile names are path components; only allow the characters the
/// platform itself allows in usernames.
fn validate_username(username: &str) -> ApiResult<()> {
    if username.is_empty() {
        return Err(ApiError::validation("username is required"));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ApiError::validation("username contains invalid characters"));
    }
    Ok(())
}

/// Run the full pipeline for a profile and return its report.
pub async fn collect_clips(
    State(state): State<AppState>,
    Json(request): Json<CollectRequest>,
) -> ApiResult<Json<RunReport>> {
    let username = request.username.trim().to_lowercase();
    validate_username(&username)?;

    let num_clips = request.num_clips.unwrap_or(state.config.default_num_clips);
    if num_clips == 0 {
        return Err(ApiError::validation("num_clips must be at least 1"));
    }

    // One exclusive browser session per run, released before the response.
    let session = ChromeSession::launch().await.map_err(PipelineError::from)?;
    let locator = ClipLocator::new(session);

    let outcome = state.pipeline.run(&locator, &username, num_clips).await;

    if let Err(e) = locator.into_session().close().await {
        warn!("Failed to close browser session: {}", e);
    }

    Ok(Json(outcome?))
}
