use crate::http::{expect_success, transport};
use async_trait::async_trait;
use forge_orchestrator::clients::{ClientResult, DeploymentJob, DeploymentRequest, JobOutcome};
use reqwest::Client;
use tracing::debug;

const SERVICE: &str = "deployment";

/// Deployment job dispatcher client. Dispatch only queues the job;
/// completion comes back later through the status-update callback.
pub struct HttpDeploymentJob {
    client: Client,
    base_url: String,
}

impl HttpDeploymentJob {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl DeploymentJob for HttpDeploymentJob {
    async fn dispatch(&self, request: &DeploymentRequest) -> ClientResult<JobOutcome> {
        let url = format!("{}/jobs", self.base_url);
        debug!(workspace = %request.workspace_id, environment = %request.environment, "job dispatch");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let response = expect_success(SERVICE, response).await?;
        let outcome = response
            .json::<JobOutcome>()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        Ok(outcome)
    }
}
