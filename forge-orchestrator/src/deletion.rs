use crate::clients::{DeployAction, DeploymentRequest, WorkbenchAction, WorkbenchRequest};
use crate::error::Result;
use crate::model::DeployTarget;
use crate::orchestrator::WorkspaceOrchestrator;
use crate::outcome::Outcome;
use crate::status::WorkspaceStatus;
use tracing::{info, warn};

impl WorkspaceOrchestrator {
    /// Decommission a workspace. When the caller owns the project and
    /// an environment still shows an active deployment, an undeploy
    /// job is dispatched first; if that dispatch fails the whole
    /// deletion aborts before any store mutation and must be retried.
    /// Gateway cleanup afterwards is best-effort and only accumulates
    /// warnings.
    pub async fn delete_workspace(&self, user_id: &str, workspace_id: &str) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;
        let is_project_owner = project.is_owner(user_id);

        let mut warnings = Vec::new();
        let mut was_deployed = false;

        if is_project_owner {
            info!(user = %user_id, workspace = %workspace.id, "delete requested by project owner");
            for target in [DeployTarget::Int, DeployTarget::Prod] {
                let details = project.deployment(target);
                if !details.is_active() {
                    continue;
                }
                was_deployed = true;

                let branch = details
                    .last_deployed_branch
                    .clone()
                    .unwrap_or_default();
                let request = DeploymentRequest {
                    action: DeployAction::Undeploy,
                    environment: target,
                    branch: branch.clone(),
                    repo: self.qualified_repo(&project),
                    owner_short_id: project.owner.id.clone(),
                    workspace_id: workspace.id.clone(),
                    secure_iam: false,
                    technical_user: None,
                    env_ref: self.config.env_ref.clone(),
                };

                let dispatched = self.clients.deployment.dispatch(&request).await;
                match dispatched {
                    Ok(job) if job.success => {
                        info!(%branch, environment = %target, "undeploy triggered before deletion");
                    }
                    _ => {
                        warn!(%branch, environment = %target, "undeploy trigger failed, aborting deletion");
                        return Ok(Outcome::failed(format!(
                            "Undeploy of branch {branch} on {target} failed. \
                             Please retry deleting the workspace."
                        )));
                    }
                }
            }
        }

        // Workbench teardown is a job dispatch like creation; its
        // errors do not block the record update.
        let workbench_request = WorkbenchRequest {
            action: WorkbenchAction::Delete,
            recipe: project.recipe,
            workspace_id: workspace.id.clone(),
            owner_id: workspace.owner.id.clone(),
            repo: self.qualified_repo(&project),
            resource: String::new(),
            is_collaborator: !is_project_owner,
            pat: String::new(),
            env_ref: self.config.env_ref.clone(),
        };
        match self.clients.workbench.manage(&workbench_request).await {
            Ok(job) => {
                warnings.extend(job.errors);
                warnings.extend(job.warnings);
            }
            Err(e) => warnings.push(format!("Workbench delete dispatch failed: {e}")),
        }

        // Soft delete keeps the row for audit history.
        self.store
            .update_status(&workspace.id, WorkspaceStatus::Deleted)
            .await?;
        self.store
            .update_collaborator_details(&project.name, &workspace.owner, true)
            .await?;

        self.cleanup_gateway(&workspace.id, &mut warnings).await;
        if was_deployed {
            let api_service = format!("{}-api", workspace.id);
            self.cleanup_gateway(&api_service, &mut warnings).await;
        }

        info!(workspace = %workspace.id, "workspace deleted");
        Ok(Outcome::success_with_warnings(warnings))
    }

    async fn cleanup_gateway(&self, name: &str, warnings: &mut Vec<String>) {
        if let Err(e) = self.clients.gateway.delete_route(name).await {
            warn!(route = %name, "failed to delete gateway route: {e}");
            warnings.push(format!("Failed to delete gateway route {name}: {e}"));
        }
        if let Err(e) = self.clients.gateway.delete_service(name).await {
            warn!(service = %name, "failed to delete gateway service: {e}");
            warnings.push(format!("Failed to delete gateway service {name}: {e}"));
        }
    }
}
