use crate::clients::{DeployAction, DeploymentRequest};
use crate::error::Result;
use crate::model::DeployTarget;
use crate::orchestrator::WorkspaceOrchestrator;
use crate::outcome::Outcome;
use crate::status::{DeploymentStatus, StatusEvent, WorkspaceStatus};
use chrono::Utc;
use tracing::{info, warn};

impl WorkspaceOrchestrator {
    /// Dispatch a deploy job. A successful dispatch only records
    /// `DEPLOY_REQUESTED` for the environment; the actual transition
    /// arrives later through [`apply_status_update`].
    ///
    /// [`apply_status_update`]: WorkspaceOrchestrator::apply_status_update
    pub async fn deploy_workspace(
        &self,
        user_id: &str,
        workspace_id: &str,
        target: DeployTarget,
        branch: &str,
        secure_iam: bool,
        technical_user: Option<String>,
    ) -> Result<Outcome> {
        self.dispatch_deployment(
            user_id,
            workspace_id,
            target,
            branch,
            DeployAction::Deploy,
            secure_iam,
            technical_user,
        )
        .await
    }

    /// Dispatch an undeploy job; records `UNDEPLOY_REQUESTED` on
    /// success.
    pub async fn undeploy_workspace(
        &self,
        user_id: &str,
        workspace_id: &str,
        target: DeployTarget,
        branch: &str,
    ) -> Result<Outcome> {
        self.dispatch_deployment(
            user_id,
            workspace_id,
            target,
            branch,
            DeployAction::Undeploy,
            false,
            None,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch_deployment(
        &self,
        user_id: &str,
        workspace_id: &str,
        target: DeployTarget,
        branch: &str,
        action: DeployAction,
        secure_iam: bool,
        technical_user: Option<String>,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;

        // Policy, not a transient error: imported-repo recipes are
        // never deployable, and no external call is made for them.
        if !project.recipe.profile().deployable {
            return Ok(Outcome::failed(format!(
                "Deploy and undeploy are not available for recipe type {}",
                project.recipe.as_str()
            )));
        }

        let owner_workspace = self
            .store
            .find_by_project(&project.owner.id, &project.name)
            .await?;

        let request = DeploymentRequest {
            action,
            environment: target,
            branch: branch.to_string(),
            repo: self.qualified_repo(&project),
            owner_short_id: workspace.owner.id.clone(),
            workspace_id: owner_workspace.id.clone(),
            secure_iam,
            technical_user: technical_user.clone(),
            env_ref: self.config.env_ref.clone(),
        };

        match self.clients.deployment.dispatch(&request).await {
            Ok(job) if job.success => {
                let mut details = project.deployment(target).clone();
                match action {
                    DeployAction::Deploy => {
                        details.last_deployment_status = Some(DeploymentStatus::DeployRequested);
                        details.secure_with_iam = secure_iam;
                        details.technical_user = technical_user;
                    }
                    DeployAction::Undeploy => {
                        details.last_deployment_status = Some(DeploymentStatus::UndeployRequested);
                    }
                }
                self.store
                    .update_deployment_details(&project.name, target, &details)
                    .await?;
                info!(workspace = %workspace.id, environment = %target, ?action, %branch, "job dispatched");
                Ok(Outcome::success_with_warnings(job.warnings))
            }
            Ok(job) => {
                let mut outcome = Outcome::failed(format!(
                    "Failed to dispatch {action:?} job for {target}"
                ));
                for error in job.errors {
                    outcome.push_error(error);
                }
                Ok(outcome)
            }
            Err(e) => Ok(Outcome::failed(format!(
                "Failed to dispatch {action:?} job for {target}: {e}"
            ))),
        }
    }

    /// Out-of-band completion callback from the job system. Must be
    /// safe to invoke repeatedly for the same event.
    pub async fn apply_status_update(
        &self,
        user_id: &str,
        workspace_name: &str,
        target: Option<DeployTarget>,
        branch: Option<String>,
        event: StatusEvent,
    ) -> Result<Outcome> {
        match event {
            StatusEvent::Workspace(status) => {
                self.apply_workspace_status(user_id, workspace_name, status)
                    .await
            }
            StatusEvent::Deployment(status) => {
                self.apply_deployment_status(user_id, workspace_name, target, branch, status)
                    .await
            }
        }
    }

    async fn apply_workspace_status(
        &self,
        user_id: &str,
        workspace_name: &str,
        status: WorkspaceStatus,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_name).await?;

        if workspace.status == status {
            // Repeated callback for the same event; nothing to redo.
            return Ok(Outcome::success());
        }
        if !workspace.status.can_transition_to(status) {
            warn!(workspace = %workspace.id, from = %workspace.status, to = %status, "invalid status transition");
            return Ok(Outcome::failed(format!(
                "Invalid status transition from {} to {status}",
                workspace.status
            )));
        }

        if status == WorkspaceStatus::Created {
            let project = self.store.get_project(&workspace.project_name).await?;
            let url = self.workspace_url(&workspace.id, project.recipe);
            self.store.update_workspace_url(&workspace.id, &url).await?;
        }
        self.store.update_status(&workspace.id, status).await?;

        info!(workspace = %workspace.id, from = %workspace.status, to = %status, "workspace status updated");
        Ok(Outcome::success())
    }

    async fn apply_deployment_status(
        &self,
        user_id: &str,
        workspace_name: &str,
        target: Option<DeployTarget>,
        branch: Option<String>,
        status: DeploymentStatus,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_name).await?;
        let project = self.store.get_project(&workspace.project_name).await?;
        let profile = project.recipe.profile();

        if !profile.deployable {
            return Ok(Outcome::failed(format!(
                "Deployment status updates are not applicable to recipe type {}",
                project.recipe.as_str()
            )));
        }

        let Some(target) = target else {
            return Ok(Outcome::failed(
                "A target environment is required for deployment status updates",
            ));
        };

        let owner_workspace = self
            .store
            .find_by_project(&project.owner.id, &project.name)
            .await?;

        let mut details = project.deployment(target).clone();
        match status {
            DeploymentStatus::Deployed => {
                // Idempotent against repeated callbacks: the URL is
                // only set when still empty.
                if details.deployment_url.as_deref().unwrap_or("").is_empty() {
                    details.deployment_url =
                        Some(self.deployment_url(&owner_workspace.id, target, project.recipe));
                }
                if branch.is_some() {
                    details.last_deployed_branch = branch;
                }
                details.last_deployed_by = Some(workspace.owner.clone());
                details.last_deployed_on = Some(Utc::now());
                details.last_deployment_status = Some(status);
                self.store
                    .update_deployment_details(&project.name, target, &details)
                    .await?;

                let service_name = format!("{workspace_name}-api");
                if let Err(e) = self
                    .clients
                    .gateway
                    .register_for_deployment(&service_name, target, !profile.exposes_ui)
                    .await
                {
                    warn!(service = %service_name, "gateway registration failed: {e}");
                    return Ok(Outcome::success_with_warnings(vec![format!(
                        "Failed to register gateway entry {service_name}: {e}"
                    )]));
                }
            }
            DeploymentStatus::Undeployed => {
                details.deployment_url = None;
                details.last_deployment_status = Some(status);
                self.store
                    .update_deployment_details(&project.name, target, &details)
                    .await?;
            }
            other => {
                details.last_deployment_status = Some(other);
                self.store
                    .update_deployment_details(&project.name, target, &details)
                    .await?;
            }
        }

        info!(
            project = %project.name,
            environment = %target,
            %status,
            "deployment details updated"
        );
        Ok(Outcome::success())
    }
}
