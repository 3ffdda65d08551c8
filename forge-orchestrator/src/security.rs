use crate::clients::NotificationEvent;
use crate::error::Result;
use crate::model::{GovernanceDetails, Project, SecurityConfig, SecurityConfigStatus, UserInfo};
use crate::orchestrator::WorkspaceOrchestrator;
use crate::outcome::Outcome;
use tracing::{info, warn};

impl WorkspaceOrchestrator {
    /// Save the project security configuration. Publishing also
    /// snapshots the published variant. Depending on the resulting
    /// status, platform admins or the project members are notified;
    /// notification failures never fail the save.
    pub async fn save_security_config(
        &self,
        user_id: &str,
        workspace_id: &str,
        config: SecurityConfig,
        publish: bool,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;

        if !project.is_owner(user_id) {
            return Ok(Outcome::failed(
                "Only the project owner can edit the security configuration",
            ));
        }

        let mut config = config;
        if publish {
            config.status = SecurityConfigStatus::Published;
        }
        self.store
            .update_security_config(&project.name, &config, publish)
            .await?;

        self.notify_for_status(&project, user_id, config.status).await;

        info!(project = %project.name, status = ?config.status, "security config saved");
        Ok(Outcome::success())
    }

    /// Move a project's security configuration to a new review status.
    /// Addressed by project name because reviewers hold no workspace
    /// in the project.
    pub async fn update_security_config_status(
        &self,
        user_id: &str,
        project_name: &str,
        status: SecurityConfigStatus,
    ) -> Result<Outcome> {
        let project = self.store.get_project(project_name).await?;

        self.store
            .update_security_config_status(&project.name, status)
            .await?;

        self.notify_for_status(&project, user_id, status).await;

        info!(project = %project.name, ?status, "security config status updated");
        Ok(Outcome::success())
    }

    /// Replace the project governance record.
    pub async fn update_governance(
        &self,
        user_id: &str,
        workspace_id: &str,
        governance: GovernanceDetails,
    ) -> Result<Outcome> {
        let workspace = self.store.find_workspace(user_id, workspace_id).await?;
        let project = self.store.get_project(&workspace.project_name).await?;

        if !project.is_owner(user_id) {
            return Ok(Outcome::failed(
                "Only the project owner can edit governance details",
            ));
        }

        self.store.update_governance(&project.name, &governance).await?;

        info!(project = %project.name, "governance details updated");
        Ok(Outcome::success())
    }

    /// Fan-out rules: a review request goes to platform admins, an
    /// accepted or published configuration goes to the project
    /// members. Draft and rejected changes notify nobody here.
    async fn notify_for_status(
        &self,
        project: &Project,
        actor_id: &str,
        status: SecurityConfigStatus,
    ) {
        let (recipients, message) = match status {
            SecurityConfigStatus::Requested => {
                let admins = match self.clients.directory.list_by_role(&self.config.admin_role).await
                {
                    Ok(admins) => admins,
                    Err(e) => {
                        warn!(role = %self.config.admin_role, "admin lookup failed: {e}");
                        return;
                    }
                };
                let recipients: Vec<(String, Option<String>)> =
                    admins.into_iter().map(|a| (a.id, a.email)).collect();
                (
                    recipients,
                    format!(
                        "Security configuration review requested for project {}",
                        project.name
                    ),
                )
            }
            SecurityConfigStatus::Accepted | SecurityConfigStatus::Published => {
                let mut recipients = vec![(project.owner.id.clone(), project.owner.email.clone())];
                recipients.extend(
                    project
                        .collaborators
                        .iter()
                        .map(|c: &UserInfo| (c.id.clone(), c.email.clone())),
                );
                (
                    recipients,
                    format!(
                        "Security configuration for project {} is now {status:?}",
                        project.name
                    ),
                )
            }
            SecurityConfigStatus::Draft | SecurityConfigStatus::Rejected => return,
        };

        let event = NotificationEvent {
            event_type: "security-config".to_string(),
            resource_id: project.name.clone(),
            actor_id: actor_id.to_string(),
            message,
            recipient_ids: recipients.iter().map(|(id, _)| id.clone()).collect(),
            recipient_emails: recipients.into_iter().filter_map(|(_, email)| email).collect(),
            change_log: None,
        };
        if let Err(e) = self.clients.notifications.publish(&event).await {
            warn!(project = %project.name, "notification publish failed: {e}");
        }
    }
}
