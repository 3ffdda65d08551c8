use crate::http::{expect_success, transport};
use async_trait::async_trait;
use forge_orchestrator::clients::{
    ClientResult, JobOutcome, WorkbenchProvisioner, WorkbenchRequest,
};
use reqwest::Client;
use tracing::debug;

const SERVICE: &str = "workbench";

/// Workbench provisioning service client. Create and delete share one
/// endpoint; the request carries the action.
pub struct HttpWorkbenchProvisioner {
    client: Client,
    base_url: String,
}

impl HttpWorkbenchProvisioner {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl WorkbenchProvisioner for HttpWorkbenchProvisioner {
    async fn manage(&self, request: &WorkbenchRequest) -> ClientResult<JobOutcome> {
        let url = format!("{}/workbenches", self.base_url);
        debug!(workspace = %request.workspace_id, ?request.action, "workbench manage");

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
