use crate::error::{OrchestratorError, Result};
use crate::model::{
    DeployTarget, DeploymentDetails, GovernanceDetails, Project, SecurityConfig,
    SecurityConfigStatus, UserInfo, Workspace,
};
use crate::recipe::RecipeId;
use crate::status::WorkspaceStatus;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Durable record of projects and workspace rows. Nested aggregates
/// (owner, collaborator list, deployment details, security config)
/// are stored as JSON text columns; targeted updates rewrite only the
/// column they address.
#[derive(Clone)]
pub struct WorkspaceStore {
    pool: SqlitePool,
}

impl WorkspaceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Allocate the next value of the global workspace id sequence.
    pub async fn next_workspace_seq(&self) -> Result<i64> {
        let result = sqlx::query("INSERT INTO workspace_seq (allocated_at) VALUES (?)")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Persist a new project together with its owner and collaborator
    /// workspace rows as a single batch write.
    pub async fn create_project(&self, project: &Project, workspaces: &[Workspace]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO projects (name, recipe, repo_name, owner, collaborators,
                                  int_deployment, prod_deployment, security_config,
                                  published_security_config, governance, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.name)
        .bind(project.recipe)
        .bind(&project.repo_name)
        .bind(serde_json::to_string(&project.owner)?)
        .bind(serde_json::to_string(&project.collaborators)?)
        .bind(serde_json::to_string(&project.int_deployment)?)
        .bind(serde_json::to_string(&project.prod_deployment)?)
        .bind(opt_json(&project.security_config)?)
        .bind(opt_json(&project.published_security_config)?)
        .bind(opt_json(&project.governance)?)
        .bind(project.created_at.timestamp())
        .execute(&mut *tx)
        .await?;

        for workspace in workspaces {
            insert_workspace(&mut tx, workspace).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Insert additional workspace rows for an existing project.
    pub async fn insert_workspaces(&self, workspaces: &[Workspace]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for workspace in workspaces {
            insert_workspace(&mut tx, workspace).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn get_project(&self, name: &str) -> Result<Project> {
        let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("project {name}")))?;

        row.try_into()
    }

    /// Look up a workspace by id, scoped to its owning user.
    pub async fn find_workspace(&self, owner_id: &str, id: &str) -> Result<Workspace> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            "SELECT * FROM workspaces WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| OrchestratorError::NotFound(format!("workspace {id}")))?;

        row.try_into()
    }

    /// The workspace row a user holds for a given project.
    pub async fn find_by_project(&self, owner_id: &str, project_name: &str) -> Result<Workspace> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            "SELECT * FROM workspaces WHERE project_name = ? AND owner_id = ? AND status != ?",
        )
        .bind(project_name)
        .bind(owner_id)
        .bind(WorkspaceStatus::Deleted)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            OrchestratorError::NotFound(format!("workspace of {owner_id} in {project_name}"))
        })?;

        row.try_into()
    }

    /// Resolve a member's workspace id by (project, user), ignoring
    /// soft-deleted rows.
    pub async fn workspace_id_for(
        &self,
        user_id: &str,
        project_name: &str,
    ) -> Result<Option<String>> {
        let id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM workspaces WHERE project_name = ? AND owner_id = ? AND status != ?",
        )
        .bind(project_name)
        .bind(user_id)
        .bind(WorkspaceStatus::Deleted)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn list_for_user(&self, owner_id: &str) -> Result<Vec<Workspace>> {
        let rows = sqlx::query_as::<_, WorkspaceRow>(
            "SELECT * FROM workspaces WHERE owner_id = ? AND status != ? ORDER BY id",
        )
        .bind(owner_id)
        .bind(WorkspaceStatus::Deleted)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn workspaces_for_project(&self, project_name: &str) -> Result<Vec<Workspace>> {
        let rows = sqlx::query_as::<_, WorkspaceRow>(
            "SELECT * FROM workspaces WHERE project_name = ? ORDER BY id",
        )
        .bind(project_name)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn total_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workspaces")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn update_status(&self, id: &str, status: WorkspaceStatus) -> Result<()> {
        let result = sqlx::query("UPDATE workspaces SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::NotFound(format!("workspace {id}")));
        }
        Ok(())
    }

    pub async fn update_workspace_url(&self, id: &str, url: &str) -> Result<()> {
        sqlx::query("UPDATE workspaces SET workspace_url = ? WHERE id = ?")
            .bind(url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Stamp a collaborator row that just requested its workbench.
    pub async fn set_initiated(
        &self,
        id: &str,
        initiated_on: DateTime<Utc>,
        status: WorkspaceStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE workspaces SET initiated_on = ?, status = ? WHERE id = ?")
            .bind(initiated_on.timestamp())
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_deployment_details(
        &self,
        project_name: &str,
        target: DeployTarget,
        details: &DeploymentDetails,
    ) -> Result<()> {
        let sql = match target {
            DeployTarget::Int => "UPDATE projects SET int_deployment = ? WHERE name = ?",
            DeployTarget::Prod => "UPDATE projects SET prod_deployment = ? WHERE name = ?",
        };

        let result = sqlx::query(sql)
            .bind(serde_json::to_string(details)?)
            .bind(project_name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::NotFound(format!("project {project_name}")));
        }
        Ok(())
    }

    /// Add a user to (or remove one from) the project's collaborator
    /// list.
    pub async fn update_collaborator_details(
        &self,
        project_name: &str,
        user: &UserInfo,
        remove: bool,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let raw = sqlx::query_scalar::<_, String>(
            "SELECT collaborators FROM projects WHERE name = ?",
        )
        .bind(project_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| OrchestratorError::NotFound(format!("project {project_name}")))?;

        let mut collaborators: Vec<UserInfo> = serde_json::from_str(&raw)?;
        if remove {
            collaborators.retain(|c| !c.id.eq_ignore_ascii_case(&user.id));
        } else if !collaborators.iter().any(|c| c.id.eq_ignore_ascii_case(&user.id)) {
            collaborators.push(user.clone());
        }

        sqlx::query("UPDATE projects SET collaborators = ? WHERE name = ?")
            .bind(serde_json::to_string(&collaborators)?)
            .bind(project_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Ownership transfer: set the new owner, move the previous owner
    /// into the collaborator list, and drop the new owner from it.
    /// All three updates commit atomically; the new owner must
    /// already be a collaborator.
    pub async fn reassign_owner(&self, project_name: &str, new_owner: &UserInfo) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT owner, collaborators FROM projects WHERE name = ?",
        )
        .bind(project_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| OrchestratorError::NotFound(format!("project {project_name}")))?;

        let previous_owner: UserInfo = serde_json::from_str(&row.0)?;
        let mut collaborators: Vec<UserInfo> = serde_json::from_str(&row.1)?;

        if !collaborators.iter().any(|c| c.id.eq_ignore_ascii_case(&new_owner.id)) {
            return Err(OrchestratorError::InvalidInput(format!(
                "{} is not a collaborator of project {project_name}",
                new_owner.id
            )));
        }

        collaborators.retain(|c| !c.id.eq_ignore_ascii_case(&new_owner.id));
        collaborators.push(previous_owner);

        sqlx::query("UPDATE projects SET owner = ?, collaborators = ? WHERE name = ?")
            .bind(serde_json::to_string(new_owner)?)
            .bind(serde_json::to_string(&collaborators)?)
            .bind(project_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Save the draft security config on the project aggregate; when
    /// publishing, the published variant is written alongside.
    pub async fn update_security_config(
        &self,
        project_name: &str,
        config: &SecurityConfig,
        published: bool,
    ) -> Result<()> {
        let raw = serde_json::to_string(config)?;
        let result = if published {
            sqlx::query(
                "UPDATE projects SET security_config = ?, published_security_config = ? WHERE name = ?",
            )
            .bind(&raw)
            .bind(&raw)
            .bind(project_name)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query("UPDATE projects SET security_config = ? WHERE name = ?")
                .bind(&raw)
                .bind(project_name)
                .execute(&self.pool)
                .await?
        };

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::NotFound(format!("project {project_name}")));
        }
        Ok(())
    }

    pub async fn update_security_config_status(
        &self,
        project_name: &str,
        status: SecurityConfigStatus,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let raw = sqlx::query_scalar::<_, Option<String>>(
            "SELECT security_config FROM projects WHERE name = ?",
        )
        .bind(project_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| OrchestratorError::NotFound(format!("project {project_name}")))?;

        let raw = raw.ok_or_else(|| {
            OrchestratorError::InvalidInput(format!(
                "project {project_name} has no security config"
            ))
        })?;

        let mut config: SecurityConfig = serde_json::from_str(&raw)?;
        config.status = status;

        sqlx::query("UPDATE projects SET security_config = ? WHERE name = ?")
            .bind(serde_json::to_string(&config)?)
            .bind(project_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_governance(
        &self,
        project_name: &str,
        governance: &GovernanceDetails,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE projects SET governance = ? WHERE name = ?")
            .bind(serde_json::to_string(governance)?)
            .bind(project_name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::NotFound(format!("project {project_name}")));
        }
        Ok(())
    }
}

async fn insert_workspace(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    workspace: &Workspace,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO workspaces (id, project_name, owner_id, owner, status,
                                workspace_url, initiated_on)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&workspace.id)
    .bind(&workspace.project_name)
    .bind(&workspace.owner.id)
    .bind(serde_json::to_string(&workspace.owner)?)
    .bind(workspace.status)
    .bind(&workspace.workspace_url)
    .bind(workspace.initiated_on.map(|dt| dt.timestamp()))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn opt_json<T: serde::Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(Into::into)
}

// Internal row types for sqlx
#[derive(sqlx::FromRow)]
struct ProjectRow {
    name: String,
    recipe: RecipeId,
    repo_name: String,
    owner: String,
    collaborators: String,
    int_deployment: String,
    prod_deployment: String,
    security_config: Option<String>,
    published_security_config: Option<String>,
    governance: Option<String>,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: String,
    project_name: String,
    #[allow(dead_code)]
    owner_id: String,
    owner: String,
    status: WorkspaceStatus,
    workspace_url: String,
    initiated_on: Option<i64>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = OrchestratorError;

    fn try_from(row: ProjectRow) -> Result<Self> {
        Ok(Self {
            name: row.name,
            recipe: row.recipe,
            repo_name: row.repo_name,
            owner: serde_json::from_str(&row.owner)?,
            collaborators: serde_json::from_str(&row.collaborators)?,
            int_deployment: serde_json::from_str(&row.int_deployment)?,
            prod_deployment: serde_json::from_str(&row.prod_deployment)?,
            security_config: row
                .security_config
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            published_security_config: row
                .published_security_config
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            governance: row
                .governance
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
        })
    }
}

impl TryFrom<WorkspaceRow> for Workspace {
    type Error = OrchestratorError;

    fn try_from(row: WorkspaceRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            project_name: row.project_name,
            owner: serde_json::from_str(&row.owner)?,
            status: row.status,
            workspace_url: row.workspace_url,
            initiated_on: row
                .initiated_on
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }
}
