use crate::http::{expect_success, transport};
use async_trait::async_trait;
use forge_orchestrator::clients::{ClientError, ClientResult, DirectoryUser, UserDirectory};
use reqwest::Client;
use tracing::debug;

const SERVICE: &str = "directory";

/// User directory client, used for admin notification fan-out.
pub struct HttpUserDirectory {
    client: Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn list_by_role(&self, role: &str) -> ClientResult<Vec<DirectoryUser>> {
        let url = format!("{}/roles/{role}/users", self.base_url);

        // Idempotent read; retried once on a transport failure.
        let mut last_error = None;
        for attempt in 0..2 {
            match self.client.get(&url).send().await {
                Ok(response) => {
                    let response = expect_success(SERVICE, response).await?;
                    return response
                        .json::<Vec<DirectoryUser>>()
                        .await
                        .map_err(|e| transport(SERVICE, e));
                }
                Err(e) => {
                    debug!(%role, attempt, "directory lookup transport error: {e}");
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
