use crate::clients::Clients;
use crate::config::OrchestratorConfig;
use crate::error::Result;
use crate::model::{DeployTarget, Project, Workspace};
use crate::recipe::RecipeId;
use crate::store::WorkspaceStore;

pub(crate) const WORKSPACE_PREFIX: &str = "WS-";

/// Coordinates the git host, workbench provisioner, deployment job
/// system, gateway registrar, and notification bus into one
/// consistent project/workspace record.
///
/// External-call steps within an operation run sequentially: later
/// steps depend on earlier ones' success, and compensation needs to
/// know exactly what succeeded. Nothing here blocks on asynchronous
/// job completion; that arrives through [`apply_status_update`].
///
/// [`apply_status_update`]: WorkspaceOrchestrator::apply_status_update
#[derive(Clone)]
pub struct WorkspaceOrchestrator {
    pub(crate) store: WorkspaceStore,
    pub(crate) clients: Clients,
    pub(crate) config: OrchestratorConfig,
}

impl WorkspaceOrchestrator {
    pub fn new(store: WorkspaceStore, clients: Clients, config: OrchestratorConfig) -> Self {
        Self {
            store,
            clients,
            config,
        }
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub async fn get_workspace(&self, user_id: &str, id: &str) -> Result<Workspace> {
        self.store.find_workspace(user_id, id).await
    }

    pub async fn get_by_project_name(&self, user_id: &str, project_name: &str) -> Result<Workspace> {
        self.store.find_by_project(user_id, project_name).await
    }

    pub async fn get_project(&self, name: &str) -> Result<Project> {
        self.store.get_project(name).await
    }

    pub async fn list_workspaces(&self, user_id: &str) -> Result<Vec<Workspace>> {
        self.store.list_for_user(user_id).await
    }

    pub async fn total_workspace_count(&self) -> Result<i64> {
        self.store.total_count().await
    }

    /// Allocate the next sequence-derived workspace id.
    pub(crate) async fn allocate_workspace_id(&self) -> Result<String> {
        let seq = self.store.next_workspace_seq().await?;
        Ok(format!("{WORKSPACE_PREFIX}{seq}"))
    }

    /// Org-qualified repository reference, or the caller-supplied
    /// reference as-is for external-repo recipes.
    pub(crate) fn qualified_repo(&self, project: &Project) -> String {
        if project.recipe.profile().external_repo {
            project.repo_name.clone()
        } else {
            format!(
                "{}{}/{}",
                self.config.git_org_uri, self.config.git_org_name, project.repo_name
            )
        }
    }

    /// Browsable URL for a created workbench. The recipe decides the
    /// path suffix; recipes without one get the bare editor URL.
    pub(crate) fn workspace_url(&self, workspace_id: &str, recipe: RecipeId) -> String {
        let mut url = format!(
            "{}/{}/?folder=/home/coder",
            self.config.base_uri, workspace_id
        );
        if let Some(path) = recipe.profile().workspace_path {
            url.push('/');
            url.push_str(path);
        }
        url
    }

    /// URL under which a deployed service is reachable, always
    /// addressed by the owner workspace id.
    pub(crate) fn deployment_url(
        &self,
        owner_workspace_id: &str,
        target: DeployTarget,
        recipe: RecipeId,
    ) -> String {
        let base = format!("{}/{}/{}/", self.config.base_uri, owner_workspace_id, target);
        let path = recipe.profile().deploy_path;
        if path.is_empty() {
            base
        } else {
            format!("{base}{path}")
        }
    }
}
