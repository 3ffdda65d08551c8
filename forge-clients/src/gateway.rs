use crate::http::{expect_success, transport};
use async_trait::async_trait;
use forge_orchestrator::clients::{ClientResult, GatewayRegistrar};
use forge_orchestrator::DeployTarget;
use reqwest::{Client, StatusCode};
use tracing::debug;

const SERVICE: &str = "gateway";

/// API gateway admin client.
pub struct HttpGatewayRegistrar {
    client: Client,
    admin_url: String,
}

impl HttpGatewayRegistrar {
    pub fn new(client: Client, admin_url: String) -> Self {
        Self { client, admin_url }
    }

    /// Deletes are used for cleanup; an entry that is already gone
    /// counts as deleted.
    async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = format!("{}/{path}", self.admin_url);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(%path, "gateway entry already absent");
            return Ok(());
        }
        expect_success(SERVICE, response).await?;
        Ok(())
    }
}

#[async_trait]
impl GatewayRegistrar for HttpGatewayRegistrar {
    async fn delete_route(&self, name: &str) -> ClientResult<()> {
        self.delete(&format!("routes/{name}")).await
    }

    async fn delete_service(&self, name: &str) -> ClientResult<()> {
        self.delete(&format!("services/{name}")).await
    }

    async fn register_for_deployment(
        &self,
        service_name: &str,
        environment: DeployTarget,
        is_api_recipe: bool,
    ) -> ClientResult<()> {
        let url = format!("{}/services", self.admin_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "name": service_name,
                "environment": environment,
                "api": is_api_recipe,
            }))
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        expect_success(SERVICE, response).await?;
        Ok(())
    }
}
