use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workspace-level lifecycle states. The orchestrator only ever sets
/// the `*Requested` states synchronously; the terminal states arrive
/// through the out-of-band status callback from the job system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceStatus {
    CreateRequested,
    CollabRequested,
    Created,
    CreateFailed,
    DeleteRequested,
    Deleted,
}

/// Per-environment deployment states carried in `DeploymentDetails`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatus {
    DeployRequested,
    Deployed,
    DeployFailed,
    UndeployRequested,
    Undeployed,
    UndeployFailed,
}

/// A status reported by the external job system, already classified
/// into the workspace or deployment family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    Workspace(WorkspaceStatus),
    Deployment(DeploymentStatus),
}

impl WorkspaceStatus {
    /// Transition table for the asynchronous completion boundary.
    /// `CreateFailed` and `Deleted` are terminal; `CreateFailed` is
    /// not retried automatically.
    pub fn can_transition_to(&self, next: WorkspaceStatus) -> bool {
        use WorkspaceStatus::*;
        matches!(
            (self, next),
            (CreateRequested, Created)
                | (CreateRequested, CreateFailed)
                | (CollabRequested, CreateRequested)
                | (CollabRequested, Created)
                | (CollabRequested, CreateFailed)
                | (Created, DeleteRequested)
                | (Created, Deleted)
                | (DeleteRequested, Deleted)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkspaceStatus::Deleted | WorkspaceStatus::CreateFailed)
    }
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkspaceStatus::CreateRequested => "CREATE_REQUESTED",
            WorkspaceStatus::CollabRequested => "COLLAB_REQUESTED",
            WorkspaceStatus::Created => "CREATED",
            WorkspaceStatus::CreateFailed => "CREATE_FAILED",
            WorkspaceStatus::DeleteRequested => "DELETE_REQUESTED",
            WorkspaceStatus::Deleted => "DELETED",
        };
        f.write_str(s)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentStatus::DeployRequested => "DEPLOY_REQUESTED",
            DeploymentStatus::Deployed => "DEPLOYED",
            DeploymentStatus::DeployFailed => "DEPLOY_FAILED",
            DeploymentStatus::UndeployRequested => "UNDEPLOY_REQUESTED",
            DeploymentStatus::Undeployed => "UNDEPLOYED",
            DeploymentStatus::UndeployFailed => "UNDEPLOY_FAILED",
        };
        f.write_str(s)
    }
}

impl FromStr for StatusEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let event = match s {
            "CREATE_REQUESTED" => StatusEvent::Workspace(WorkspaceStatus::CreateRequested),
            "COLLAB_REQUESTED" => StatusEvent::Workspace(WorkspaceStatus::CollabRequested),
            "CREATED" => StatusEvent::Workspace(WorkspaceStatus::Created),
            "CREATE_FAILED" => StatusEvent::Workspace(WorkspaceStatus::CreateFailed),
            "DELETE_REQUESTED" => StatusEvent::Workspace(WorkspaceStatus::DeleteRequested),
            "DELETED" => StatusEvent::Workspace(WorkspaceStatus::Deleted),
            "DEPLOY_REQUESTED" => StatusEvent::Deployment(DeploymentStatus::DeployRequested),
            "DEPLOYED" => StatusEvent::Deployment(DeploymentStatus::Deployed),
            "DEPLOY_FAILED" => StatusEvent::Deployment(DeploymentStatus::DeployFailed),
            "UNDEPLOY_REQUESTED" => StatusEvent::Deployment(DeploymentStatus::UndeployRequested),
            "UNDEPLOYED" => StatusEvent::Deployment(DeploymentStatus::Undeployed),
            "UNDEPLOY_FAILED" => StatusEvent::Deployment(DeploymentStatus::UndeployFailed),
            other => return Err(format!("unknown status: {other}")),
        };
        Ok(event)
    }
}
