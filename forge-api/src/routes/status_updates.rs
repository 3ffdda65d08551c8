use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{extract::State, routing::post, Json, Router};
use forge_orchestrator::{DeployTarget, Outcome, StatusEvent};
use serde::Deserialize;
use tracing::info;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/status-updates", post(apply_status_update))
}

/// Completion callback from the job system. The payload names the
/// workspace owner because jobs act on behalf of a member, and the
/// status string is classified into the workspace or deployment
/// family before it is applied.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub owner_id: String,
    pub workspace_id: String,
    pub status: String,
    #[serde(default)]
    pub environment: Option<DeployTarget>,
    #[serde(default)]
    pub branch: Option<String>,
}

async fn apply_status_update(
    State(state): State<AppState>,
    Json(req): Json<StatusUpdateRequest>,
) -> ApiResult<Json<Outcome>> {
    let event: StatusEvent = req
        .status
        .parse()
        .map_err(|e: String| ApiError::BadRequest(e))?;

    info!(workspace = %req.workspace_id, status = %req.status, "status update received");

    let outcome = state
        .orchestrator
        .apply_status_update(
            &req.owner_id,
            &req.workspace_id,
            req.environment,
            req.branch,
            event,
        )
        .await?;

    Ok(Json(outcome))
}
