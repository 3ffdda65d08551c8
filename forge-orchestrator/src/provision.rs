use crate::clients::{WorkbenchAction, WorkbenchRequest};
use crate::error::{OrchestratorError, Result};
use crate::model::{DeploymentDetails, Project, UserInfo, Workspace};
use crate::orchestrator::WorkspaceOrchestrator;
use crate::outcome::Outcome;
use crate::recipe::RecipeId;
use crate::status::WorkspaceStatus;
use chrono::Utc;
use tracing::{info, warn};

/// Inputs for project provisioning.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub project_name: String,
    pub recipe: RecipeId,
    /// External repository reference; required for imported-repo
    /// recipes, ignored otherwise.
    pub repo_reference: Option<String>,
    /// Resource sizing passed through to the workbench job.
    pub resource: String,
    pub owner: UserInfo,
    pub collaborators: Vec<UserInfo>,
    pub pat: String,
}

#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub outcome: Outcome,
    /// The persisted owner workspace row on success.
    pub workspace: Option<Workspace>,
}

impl ProvisionOutcome {
    fn failed(outcome: Outcome) -> Self {
        Self {
            outcome,
            workspace: None,
        }
    }
}

impl WorkspaceOrchestrator {
    /// Provision a new project: validate the token, create or reuse
    /// the repository, grant collaborator access, request the owner
    /// workbench, and persist the owner plus collaborator rows as a
    /// single batch. Fails atomically before any external side effect
    /// commits; a workbench or store failure after repository creation
    /// compensates by deleting the repository.
    pub async fn provision_project(&self, request: ProvisionRequest) -> Result<ProvisionOutcome> {
        let profile = request.recipe.profile();

        // Only a confirmed "no such project" clears the duplicate
        // check; a failing store must not let the flow reach the git
        // host.
        match self.store.get_project(&request.project_name).await {
            Ok(_) => {
                return Ok(ProvisionOutcome::failed(Outcome::failed(format!(
                    "Project {} already exists",
                    request.project_name
                ))))
            }
            Err(OrchestratorError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let repo_name = if profile.external_repo {
            match request.repo_reference.clone() {
                Some(reference) => reference,
                None => {
                    return Ok(ProvisionOutcome::failed(Outcome::failed(
                        "A repository reference is required for imported-repo recipes",
                    )))
                }
            }
        } else {
            request.project_name.clone()
        };

        // Token validation runs first; a bad PAT aborts with no side
        // effects at all.
        let validation = if profile.external_repo {
            self.clients
                .git
                .validate_public_pat(&request.owner.git_user_name, &request.pat, &repo_name)
                .await
        } else {
            self.clients
                .git
                .validate_pat(&request.owner.git_user_name, &request.pat)
                .await
        };
        if let Err(e) = validation {
            warn!(user = %request.owner.id, "PAT validation failed: {e}");
            return Ok(ProvisionOutcome::failed(Outcome::failed(
                "Invalid personal access token provided. Please verify and retry.",
            )));
        }

        let mut warnings = Vec::new();
        let mut repo_created = false;

        if profile.managed_repo {
            if let Err(e) = self.clients.git.create_repo(&repo_name).await {
                return Ok(ProvisionOutcome::failed(Outcome::failed(format!(
                    "Failed to initialize git repository {repo_name}: {e}. \
                     Please verify inputs, permissions, and existing repositories, then retry."
                ))));
            }
            repo_created = true;
        }

        if !profile.external_repo {
            // Collaborator ACL failures downgrade to warnings: the
            // repository and workspace still come up, access is fixed
            // manually.
            let mut git_users = vec![request.owner.git_user_name.clone()];
            git_users.extend(request.collaborators.iter().map(|c| c.git_user_name.clone()));
            for git_user in &git_users {
                if let Err(e) = self.clients.git.add_collaborator(git_user, &repo_name).await {
                    warn!(%git_user, repo = %repo_name, "collaborator ACL failed: {e}");
                    warnings.push(format!(
                        "Failed to add {git_user} as repository collaborator. Please add manually."
                    ));
                }
            }
        }

        let collaborators = if profile.collaborative {
            request.collaborators.clone()
        } else {
            Vec::new()
        };

        let owner_workspace_id = match self.allocate_workspace_id().await {
            Ok(id) => id,
            Err(e) => {
                self.delete_orphaned_repo(repo_created, &repo_name).await;
                return Err(e);
            }
        };
        let qualified_repo = if profile.external_repo {
            repo_name.clone()
        } else {
            format!(
                "{}{}/{}",
                self.config.git_org_uri, self.config.git_org_name, repo_name
            )
        };

        let workbench_request = WorkbenchRequest {
            action: WorkbenchAction::Create,
            recipe: request.recipe,
            workspace_id: owner_workspace_id.clone(),
            owner_id: request.owner.id.clone(),
            repo: qualified_repo,
            resource: request.resource.clone(),
            is_collaborator: false,
            pat: request.pat.clone(),
            env_ref: self.config.env_ref.clone(),
        };

        let workbench = self.clients.workbench.manage(&workbench_request).await;
        let job = match workbench {
            Ok(job) if job.success && job.errors.is_empty() => job,
            Ok(job) => {
                return Ok(ProvisionOutcome::failed(
                    self.compensate_repo(repo_created, &repo_name, job.errors, job.warnings)
                        .await,
                ));
            }
            Err(e) => {
                return Ok(ProvisionOutcome::failed(
                    self.compensate_repo(repo_created, &repo_name, vec![e.to_string()], Vec::new())
                        .await,
                ));
            }
        };
        warnings.extend(job.warnings);

        let saved = match self
            .persist_project(&request, &repo_name, collaborators, owner_workspace_id)
            .await
        {
            Ok(workspace) => workspace,
            Err(e) => {
                self.delete_orphaned_repo(repo_created, &repo_name).await;
                return Err(e);
            }
        };

        Ok(ProvisionOutcome {
            outcome: Outcome::success_with_warnings(warnings),
            workspace: Some(saved),
        })
    }

    /// Persist the project aggregate with its owner and collaborator
    /// rows, then re-read the owner row as the canonical response.
    async fn persist_project(
        &self,
        request: &ProvisionRequest,
        repo_name: &str,
        collaborators: Vec<UserInfo>,
        owner_workspace_id: String,
    ) -> Result<Workspace> {
        let now = Utc::now();
        let project = Project {
            name: request.project_name.clone(),
            recipe: request.recipe,
            repo_name: repo_name.to_string(),
            owner: request.owner.clone(),
            collaborators: collaborators.clone(),
            int_deployment: DeploymentDetails::default(),
            prod_deployment: DeploymentDetails::default(),
            security_config: None,
            published_security_config: None,
            governance: None,
            created_at: now,
        };

        let mut rows = vec![Workspace {
            id: owner_workspace_id,
            project_name: project.name.clone(),
            owner: request.owner.clone(),
            status: WorkspaceStatus::CreateRequested,
            workspace_url: String::new(),
            initiated_on: Some(now),
        }];
        for collaborator in &collaborators {
            rows.push(Workspace {
                id: self.allocate_workspace_id().await?,
                project_name: project.name.clone(),
                owner: collaborator.clone(),
                status: WorkspaceStatus::CollabRequested,
                workspace_url: String::new(),
                initiated_on: None,
            });
        }

        self.store.create_project(&project, &rows).await?;

        let saved = self
            .store
            .find_by_project(&request.owner.id, &project.name)
            .await?;

        info!(
            project = %project.name,
            workspace = %saved.id,
            rows = rows.len(),
            "project provisioning requested"
        );

        Ok(saved)
    }

    /// Remove a repository this run created when a later store failure
    /// keeps the project from being persisted.
    async fn delete_orphaned_repo(&self, repo_created: bool, repo_name: &str) {
        if !repo_created {
            return;
        }
        if let Err(e) = self.clients.git.delete_repo(repo_name).await {
            warn!(repo = %repo_name, "failed to delete orphaned repository: {e}");
        }
    }

    /// Best-effort repository rollback after a workbench failure. The
    /// original failure and the compensation result are surfaced as
    /// distinct errors, never folded into one.
    async fn compensate_repo(
        &self,
        repo_created: bool,
        repo_name: &str,
        mut errors: Vec<String>,
        warnings: Vec<String>,
    ) -> Outcome {
        errors.insert(
            0,
            "Failed to initialize workbench, please retry.".to_string(),
        );

        if repo_created {
            match self.clients.git.delete_repo(repo_name).await {
                Ok(()) => {
                    errors.push(format!(
                        "Git repository {repo_name} was created and has been deleted again."
                    ));
                }
                Err(e) => {
                    errors.push(format!(
                        "Unable to delete git repository {repo_name} ({e}); \
                         please delete it manually and retry."
                    ));
                }
            }
        }

        let mut outcome = Outcome::failed(errors.remove(0));
        for error in errors {
            outcome.push_error(error);
        }
        for warning in warnings {
            outcome.push_warning(warning);
        }
        outcome
    }
}
