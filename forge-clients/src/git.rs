use crate::http::{expect_success, transport};
use async_trait::async_trait;
use forge_orchestrator::clients::{ClientError, ClientResult, GitHost};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

const SERVICE: &str = "git";

/// Git host admin API client. Repository names are bare; the
/// configured organization qualifies them.
pub struct HttpGitHost {
    client: Client,
    base_url: String,
    org: String,
}

#[derive(Serialize)]
struct PatValidation<'a> {
    pat: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    repo: Option<&'a str>,
}

impl HttpGitHost {
    pub fn new(client: Client, base_url: String, org: String) -> Self {
        Self {
            client,
            base_url,
            org,
        }
    }

    /// Token validation is an idempotent read; a transport failure is
    /// retried once before giving up.
    async fn validate(
        &self,
        git_user: &str,
        pat: &str,
        repo: Option<&str>,
    ) -> ClientResult<()> {
        let url = format!("{}/users/{git_user}/pat/validate", self.base_url);
        let body = PatValidation { pat, repo };

        let mut last_error = None;
        for attempt in 0..2 {
            match self.client.post(&url).json(&body).send().await {
                Ok(response) => {
                    expect_success(SERVICE, response).await?;
                    return Ok(());
                }
                Err(e) => {
                    debug!(%git_user, attempt, "PAT validation transport error: {e}");
                    last_error = Some(transport(SERVICE, e));
                }
            }
        }
        Err(last_error.unwrap_or(ClientError::Transport {
            service: SERVICE,
            message: "request never sent".to_string(),
        }))
    }
}

#[async_trait]
impl GitHost for HttpGitHost {
    async fn validate_pat(&self, git_user: &str, pat: &str) -> ClientResult<()> {
        self.validate(git_user, pat, None).await
    }

    async fn validate_public_pat(&self, git_user: &str, pat: &str, repo: &str) -> ClientResult<()> {
        self.validate(git_user, pat, Some(repo)).await
    }

    async fn create_repo(&self, name: &str) -> ClientResult<()> {
        let url = format!("{}/orgs/{}/repos", self.base_url, self.org);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "name": name, "private": true, "auto_init": true }))
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        expect_success(SERVICE, response).await?;
        Ok(())
    }

    async fn delete_repo(&self, name: &str) -> ClientResult<()> {
        let url = format!("{}/orgs/{}/repos/{name}", self.base_url, self.org);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        expect_success(SERVICE, response).await?;
        Ok(())
    }

    async fn add_collaborator(&self, git_user: &str, repo: &str) -> ClientResult<()> {
        let url = format!(
            "{}/orgs/{}/repos/{repo}/collaborators/{git_user}",
            self.base_url, self.org
        );
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "permission": "write" }))
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        expect_success(SERVICE, response).await?;
        Ok(())
    }
}
