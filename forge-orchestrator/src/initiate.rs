use crate::clients::{WorkbenchAction, WorkbenchRequest};
use crate::error::Result;
use crate::orchestrator::WorkspaceOrchestrator;
use crate::outcome::Outcome;
use crate::status::WorkspaceStatus;
use chrono::Utc;
use tracing::{info, warn};

impl WorkspaceOrchestrator {
    /// A collaborator whose row is still `CollabRequested` requests
    /// their own workbench. Validates the member's token, dispatches
    /// the workbench create job, and moves the row to
    /// `CreateRequested` with an initiation timestamp.
    pub async fn initiate_workspace(
        &self,
        user_id: &str,
        workspace_id: &str,
        pat: &str,
        resource: &str,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;
        let profile = project.recipe.profile();

        if workspace.status != WorkspaceStatus::CollabRequested {
            return Ok(Outcome::failed(format!(
                "Workspace {workspace_id} is not pending initiation (status {})",
                workspace.status
            )));
        }

        let validation = if profile.external_repo {
            self.clients
                .git
                .validate_public_pat(&workspace.owner.git_user_name, pat, &project.repo_name)
                .await
        } else {
            self.clients
                .git
                .validate_pat(&workspace.owner.git_user_name, pat)
                .await
        };
        if let Err(e) = validation {
            warn!(user = %user_id, "PAT validation failed: {e}");
            return Ok(Outcome::failed(
                "Invalid personal access token provided. Please verify and retry.",
            ));
        }

        let is_collaborator = !project.is_owner(&workspace.owner.id);
        let request = WorkbenchRequest {
            action: WorkbenchAction::Create,
            recipe: project.recipe,
            workspace_id: workspace.id.clone(),
            owner_id: workspace.owner.id.clone(),
            repo: self.qualified_repo(&project),
            resource: resource.to_string(),
            is_collaborator,
            pat: pat.to_string(),
            env_ref: self.config.env_ref.clone(),
        };

        match self.clients.workbench.manage(&request).await {
            Ok(job) if job.success && job.errors.is_empty() => {
                self.store
                    .set_initiated(&workspace.id, Utc::now(), WorkspaceStatus::CreateRequested)
                    .await?;
                info!(workspace = %workspace.id, "collaborator workbench requested");
                Ok(Outcome::success_with_warnings(job.warnings))
            }
            Ok(job) => {
                let mut outcome =
                    Outcome::failed("Failed to initialize workbench, please retry.");
                for error in job.errors {
                    outcome.push_error(error);
                }
                for warning in job.warnings {
                    outcome.push_warning(warning);
                }
                Ok(outcome)
            }
            Err(e) => {
                let mut outcome =
                    Outcome::failed("Failed to initialize workbench, please retry.");
                outcome.push_error(e.to_string());
                Ok(outcome)
            }
        }
    }
}
