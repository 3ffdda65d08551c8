//! Interfaces to the external systems the orchestrator coordinates.
//!
//! Each collaborator is an async trait so the HTTP implementations in
//! forge-clients and the recording mocks used by tests are
//! interchangeable. Job-dispatch calls return a [`JobOutcome`] with
//! separate error and warning lists because the job system reports
//! partial results.

use crate::model::DeployTarget;
use crate::recipe::RecipeId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure; safe to retry for idempotent reads.
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    /// The remote system processed the request and said no.
    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
}

/// Result of a declarative job dispatch or workbench manage call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOutcome {
    pub success: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl JobOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkbenchAction {
    Create,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployAction {
    Deploy,
    Undeploy,
}

/// Inputs for a workbench create/delete job.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbenchRequest {
    pub action: WorkbenchAction,
    pub recipe: RecipeId,
    pub workspace_id: String,
    pub owner_id: String,
    pub repo: String,
    pub resource: String,
    pub is_collaborator: bool,
    /// Personal access token forwarded to the job for the initial
    /// clone; empty for delete.
    pub pat: String,
    pub env_ref: String,
}

/// Inputs for an asynchronous deploy/undeploy job. Completion is
/// reported later through the status-update entry point.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRequest {
    pub action: DeployAction,
    pub environment: DeployTarget,
    pub branch: String,
    pub repo: String,
    pub owner_short_id: String,
    pub workspace_id: String,
    pub secure_iam: bool,
    pub technical_user: Option<String>,
    pub env_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub event_type: String,
    pub resource_id: String,
    pub actor_id: String,
    pub message: String,
    pub recipient_ids: Vec<String>,
    pub recipient_emails: Vec<String>,
    pub change_log: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub email: Option<String>,
}

/// Source-control hosting: repository lifecycle and ACL.
#[async_trait]
pub trait GitHost: Send + Sync {
    async fn validate_pat(&self, git_user: &str, pat: &str) -> ClientResult<()>;

    /// PAT validation against an externally supplied repository, used
    /// by imported-repo recipes.
    async fn validate_public_pat(&self, git_user: &str, pat: &str, repo: &str) -> ClientResult<()>;

    async fn create_repo(&self, name: &str) -> ClientResult<()>;

    async fn delete_repo(&self, name: &str) -> ClientResult<()>;

    async fn add_collaborator(&self, git_user: &str, repo: &str) -> ClientResult<()>;
}

/// Compute/IDE workbench provisioning for a workspace.
#[async_trait]
pub trait WorkbenchProvisioner: Send + Sync {
    async fn manage(&self, request: &WorkbenchRequest) -> ClientResult<JobOutcome>;
}

/// Declarative deploy/undeploy job dispatch.
#[async_trait]
pub trait DeploymentJob: Send + Sync {
    async fn dispatch(&self, request: &DeploymentRequest) -> ClientResult<JobOutcome>;
}

/// API-gateway registration for workbenches and deployed services.
#[async_trait]
pub trait GatewayRegistrar: Send + Sync {
    async fn delete_route(&self, name: &str) -> ClientResult<()>;

    async fn delete_service(&self, name: &str) -> ClientResult<()>;

    async fn register_for_deployment(
        &self,
        service_name: &str,
        environment: DeployTarget,
        is_api_recipe: bool,
    ) -> ClientResult<()>;
}

/// Fire-and-forget event bus for interested user sets.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn publish(&self, event: &NotificationEvent) -> ClientResult<()>;
}

/// User directory lookup, used only for admin notification fan-out.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_by_role(&self, role: &str) -> ClientResult<Vec<DirectoryUser>>;
}

/// Bundle of all external collaborators handed to the orchestrator.
#[derive(Clone)]
pub struct Clients {
    pub git: Arc<dyn GitHost>,
    pub workbench: Arc<dyn WorkbenchProvisioner>,
    pub deployment: Arc<dyn DeploymentJob>,
    pub gateway: Arc<dyn GatewayRegistrar>,
    pub notifications: Arc<dyn NotificationPublisher>,
    pub directory: Arc<dyn UserDirectory>,
}
