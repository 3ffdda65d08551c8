use crate::error::{OrchestratorError, Result};
use crate::model::{UserInfo, Workspace};
use crate::orchestrator::WorkspaceOrchestrator;
use crate::outcome::Outcome;
use crate::status::WorkspaceStatus;
use tracing::{error, info};

impl WorkspaceOrchestrator {
    /// Grant a user access to the project: git ACL first, then a new
    /// `COLLAB_REQUESTED` workspace row and the project collaborator
    /// list. No row is created when the ACL call fails.
    pub async fn add_collaborator(
        &self,
        user_id: &str,
        workspace_id: &str,
        new_collaborator: UserInfo,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;

        if !project.recipe.profile().collaborative {
            return Ok(Outcome::failed(format!(
                "Cannot add collaborators to projects of recipe type {}",
                project.recipe.as_str()
            )));
        }
        if !project.is_owner(user_id) {
            return Ok(Outcome::failed(
                "Only the project owner can add collaborators",
            ));
        }
        if project.is_owner(&new_collaborator.id)
            || project
                .collaborators
                .iter()
                .any(|c| c.id.eq_ignore_ascii_case(&new_collaborator.id))
        {
            return Ok(Outcome::failed(format!(
                "{} is already a member of project {}",
                new_collaborator.id, project.name
            )));
        }

        if let Err(e) = self
            .clients
            .git
            .add_collaborator(&new_collaborator.git_user_name, &project.repo_name)
            .await
        {
            error!(user = %new_collaborator.git_user_name, repo = %project.repo_name, "git ACL failed: {e}");
            return Ok(Outcome::failed(format!(
                "Failed to add {} as repository collaborator: {e}. \
                 Please verify the git user and retry.",
                new_collaborator.git_user_name
            )));
        }

        let row = Workspace {
            id: self.allocate_workspace_id().await?,
            project_name: project.name.clone(),
            owner: new_collaborator.clone(),
            status: WorkspaceStatus::CollabRequested,
            workspace_url: String::new(),
            initiated_on: None,
        };
        self.store.insert_workspaces(std::slice::from_ref(&row)).await?;
        self.store
            .update_collaborator_details(&project.name, &new_collaborator, false)
            .await?;

        info!(project = %project.name, collaborator = %new_collaborator.id, workspace = %row.id, "collaborator added");
        Ok(Outcome::success())
    }

    /// Remove a collaborator by delegating to the deletion flow under
    /// the target's identity.
    pub async fn remove_collaborator(
        &self,
        user_id: &str,
        workspace_id: &str,
        remove_user_id: &str,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;

        if !project.is_owner(user_id) {
            return Ok(Outcome::failed(
                "Only the project owner can remove collaborators",
            ));
        }

        let target_id = self
            .store
            .workspace_id_for(remove_user_id, &project.name)
            .await?
            .ok_or_else(|| {
                OrchestratorError::NotFound(format!(
                    "no workspace for {remove_user_id} in project {}",
                    project.name
                ))
            })?;

        self.delete_workspace(remove_user_id, &target_id).await
    }

    /// Transfer project ownership. The three constituent updates (new
    /// owner set, previous owner added as collaborator, new owner
    /// removed from the collaborator list) commit in one store
    /// transaction; any sub-step failure reports an aggregate
    /// `FAILED`.
    pub async fn reassign_owner(
        &self,
        user_id: &str,
        workspace_id: &str,
        new_owner: UserInfo,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;

        if !project.recipe.profile().collaborative {
            return Ok(Outcome::failed(format!(
                "Cannot reassign ownership for projects of recipe type {}",
                project.recipe.as_str()
            )));
        }
        if !project.is_owner(user_id) {
            return Ok(Outcome::failed(
                "Only the project owner can transfer ownership",
            ));
        }

        match self.store.reassign_owner(&project.name, &new_owner).await {
            Ok(()) => {
                info!(project = %project.name, new_owner = %new_owner.id, "project ownership transferred");
                Ok(Outcome::success())
            }
            Err(e) => {
                error!(project = %project.name, "ownership transfer failed: {e}");
                Ok(Outcome::failed(format!(
                    "Failed to update project owner details: {e}"
                )))
            }
        }
    }
}
