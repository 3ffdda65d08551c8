//! Workspace lifecycle orchestration.
//!
//! This crate contains the core business logic for provisioning,
//! deploying, and decommissioning per-user development workspaces
//! bound to a shared project. It coordinates the git host, the
//! workbench provisioner, the deployment job system, the API gateway
//! registrar, and the notification bus into one consistent
//! project/workspace record. It is consumed by the forge-api HTTP
//! service but can also be driven by CLI commands or background
//! workers.

pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod outcome;
pub mod recipe;
pub mod status;
pub mod store;

mod collab;
mod deletion;
mod deploy;
mod initiate;
mod provision;
mod security;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use clients::{
    Clients, DeployAction, DeploymentJob, DeploymentRequest, DirectoryUser, GatewayRegistrar,
    GitHost, JobOutcome, NotificationEvent, NotificationPublisher, UserDirectory, WorkbenchAction,
    WorkbenchProvisioner, WorkbenchRequest,
};
pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, Result};
pub use model::{
    DeployTarget, DeploymentDetails, GovernanceDetails, Project, SecurityConfig,
    SecurityConfigStatus, UserInfo, Workspace,
};
pub use orchestrator::WorkspaceOrchestrator;
pub use outcome::{Outcome, OutcomeState};
pub use provision::{ProvisionOutcome, ProvisionRequest};
pub use recipe::{RecipeId, RecipeProfile};
pub use status::{DeploymentStatus, StatusEvent, WorkspaceStatus};
pub use store::WorkspaceStore;
