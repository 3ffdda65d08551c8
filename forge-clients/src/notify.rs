use crate::http::{expect_success, transport};
use async_trait::async_trait;
use forge_orchestrator::clients::{ClientResult, NotificationEvent, NotificationPublisher};
use reqwest::Client;

const SERVICE: &str = "notifications";

/// Notification bus client. Callers treat publish failures as
/// non-fatal; this client just reports them.
pub struct HttpNotificationPublisher {
    client: Client,
    base_url: String,
}

impl HttpNotificationPublisher {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl NotificationPublisher for HttpNotificationPublisher {
    async fn publish(&self, event: &NotificationEvent) -> ClientResult<()> {
        let url = format!("{}/events", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(event)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        expect_success(SERVICE, response).await?;
        Ok(())
    }
}
