use crate::{auth::AuthenticatedUser, error::ApiResult, state::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use forge_orchestrator::{
    DeployTarget, GovernanceDetails, Outcome, Project, ProvisionRequest, RecipeId, SecurityConfig,
    SecurityConfigStatus, UserInfo, Workspace,
};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/workspaces",
            get(list_workspaces).post(create_project),
        )
        .route("/api/v1/workspaces/count", get(count_workspaces))
        .route(
            "/api/v1/workspaces/{id}",
            get(get_workspace).delete(delete_workspace),
        )
        .route("/api/v1/workspaces/{id}/project", get(get_project))
        .route("/api/v1/workspaces/{id}/initiate", post(initiate_workspace))
        .route("/api/v1/workspaces/{id}/deploy", post(deploy_workspace))
        .route("/api/v1/workspaces/{id}/undeploy", post(undeploy_workspace))
        .route(
            "/api/v1/workspaces/{id}/collaborators",
            post(add_collaborator),
        )
        .route(
            "/api/v1/workspaces/{id}/collaborators/{user_id}",
            axum::routing::delete(remove_collaborator),
        )
        .route("/api/v1/workspaces/{id}/owner", put(reassign_owner))
        .route(
            "/api/v1/workspaces/{id}/security-config",
            put(save_security_config),
        )
        .route(
            "/api/v1/projects/{name}/security-config/status",
            put(update_security_config_status),
        )
        .route("/api/v1/workspaces/{id}/governance", put(update_governance))
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub project_name: String,
    pub recipe: RecipeId,
    #[serde(default)]
    pub repo_reference: Option<String>,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub collaborators: Vec<UserInfo>,
    pub pat: String,
}

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub outcome: Outcome,
    pub workspace: Option<Workspace>,
}

#[derive(Debug, Deserialize)]
pub struct InitiateRequest {
    pub pat: String,
    #[serde(default)]
    pub resource: String,
}

#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    pub environment: DeployTarget,
    pub branch: String,
    #[serde(default)]
    pub secure_with_iam: bool,
    #[serde(default)]
    pub technical_user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UndeployRequest {
    pub environment: DeployTarget,
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveSecurityConfigRequest {
    #[serde(flatten)]
    pub config: SecurityConfig,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Deserialize)]
pub struct SecurityConfigStatusRequest {
    pub status: SecurityConfigStatus,
}

async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<ProvisionResponse>> {
    let request = ProvisionRequest {
        project_name: req.project_name,
        recipe: req.recipe,
        repo_reference: req.repo_reference,
        resource: req.resource,
        owner: user.to_user_info(),
        collaborators: req.collaborators,
        pat: req.pat,
    };

    let result = state.orchestrator.provision_project(request).await?;

    Ok(Json(ProvisionResponse {
        outcome: result.outcome,
        workspace: result.workspace,
    }))
}

async fn list_workspaces(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Workspace>>> {
    let workspaces = state.orchestrator.list_workspaces(&user.id).await?;

    Ok(Json(workspaces))
}

async fn count_workspaces(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let count = state.orchestrator.total_workspace_count().await?;

    Ok(Json(serde_json::json!({ "count": count })))
}

async fn get_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Workspace>> {
    let workspace = state.orchestrator.get_workspace(&user.id, &id).await?;

    Ok(Json(workspace))
}

async fn get_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    let workspace = state.orchestrator.get_workspace(&user.id, &id).await?;
    let project = state.orchestrator.get_project(&workspace.project_name).await?;

    Ok(Json(project))
}

async fn delete_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state.orchestrator.delete_workspace(&user.id, &id).await?;

    Ok(Json(outcome))
}

async fn initiate_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<InitiateRequest>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .initiate_workspace(&user.id, &id, &req.pat, &req.resource)
        .await?;

    Ok(Json(outcome))
}

async fn deploy_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<DeployRequest>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .deploy_workspace(
            &user.id,
            &id,
            req.environment,
            &req.branch,
            req.secure_with_iam,
            req.technical_user,
        )
        .await?;

    Ok(Json(outcome))
}

async fn undeploy_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<UndeployRequest>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .undeploy_workspace(&user.id, &id, req.environment, &req.branch)
        .await?;

    Ok(Json(outcome))
}

async fn add_collaborator(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(collaborator): Json<UserInfo>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .add_collaborator(&user.id, &id, collaborator)
        .await?;

    Ok(Json(outcome))
}

async fn remove_collaborator(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .remove_collaborator(&user.id, &id, &user_id)
        .await?;

    Ok(Json(outcome))
}

async fn reassign_owner(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(new_owner): Json<UserInfo>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .reassign_owner(&user.id, &id, new_owner)
        .await?;

    Ok(Json(outcome))
}

async fn save_security_config(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<SaveSecurityConfigRequest>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .save_security_config(&user.id, &id, req.config, req.publish)
        .await?;

    Ok(Json(outcome))
}

async fn update_security_config_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(name): Path<String>,
    Json(req): Json<SecurityConfigStatusRequest>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .update_security_config_status(&user.id, &name, req.status)
        .await?;

    Ok(Json(outcome))
}

async fn update_governance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(governance): Json<GovernanceDetails>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .orchestrator
        .update_governance(&user.id, &id, governance)
        .await?;

    Ok(Json(outcome))
}
