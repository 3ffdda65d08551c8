use crate::recipe::RecipeId;
use crate::status::{DeploymentStatus, WorkspaceStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform member. `git_user_name` is the identity used against
/// the git host; `id` is the platform short id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub git_user_name: String,
    pub email: Option<String>,
}

/// Deployment environment. `Int` is staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployTarget {
    Int,
    Prod,
}

impl DeployTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployTarget::Int => "int",
            DeployTarget::Prod => "prod",
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-environment deployment record. Mutated only by
/// deploy/undeploy dispatch and the status callback; every field
/// stays empty until the environment's first deploy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentDetails {
    pub deployment_url: Option<String>,
    pub last_deployed_branch: Option<String>,
    pub last_deployed_by: Option<UserInfo>,
    pub last_deployed_on: Option<DateTime<Utc>>,
    pub last_deployment_status: Option<DeploymentStatus>,
    #[serde(default)]
    pub secure_with_iam: bool,
    pub technical_user: Option<String>,
}

impl DeploymentDetails {
    /// A deployment counts as active once the callback has populated
    /// url, branch, and status together.
    pub fn is_active(&self) -> bool {
        self.deployment_url.is_some()
            && self.last_deployed_branch.is_some()
            && self.last_deployment_status.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityConfigStatus {
    Draft,
    Requested,
    Accepted,
    Published,
    Rejected,
}

/// Security configuration attached to a project. The entries payload
/// is opaque to the orchestrator; only the status drives behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub status: SecurityConfigStatus,
    #[serde(default)]
    pub entries: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceDetails {
    pub type_of_project: Option<String>,
    pub description: Option<String>,
    pub division: Option<String>,
    pub department: Option<String>,
    pub archer_id: Option<String>,
    pub procedure_id: Option<String>,
    #[serde(default)]
    pub pii_data: bool,
}

/// The shared unit of ownership, collaboration, and deployment
/// configuration. One row per project; workspace rows reference it by
/// name instead of carrying a denormalized copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub recipe: RecipeId,
    pub repo_name: String,
    pub owner: UserInfo,
    pub collaborators: Vec<UserInfo>,
    pub int_deployment: DeploymentDetails,
    pub prod_deployment: DeploymentDetails,
    pub security_config: Option<SecurityConfig>,
    pub published_security_config: Option<SecurityConfig>,
    pub governance: Option<GovernanceDetails>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn deployment(&self, target: DeployTarget) -> &DeploymentDetails {
        match target {
            DeployTarget::Int => &self.int_deployment,
            DeployTarget::Prod => &self.prod_deployment,
        }
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner.id.eq_ignore_ascii_case(user_id)
    }
}

/// One provisioned (or pending) development environment for a single
/// project member. Deleted workspaces keep their row with status
/// `Deleted` for audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub project_name: String,
    pub owner: UserInfo,
    pub status: WorkspaceStatus,
    pub workspace_url: String,
    pub initiated_on: Option<DateTime<Utc>>,
}
