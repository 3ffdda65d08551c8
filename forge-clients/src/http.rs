//! Shared plumbing for the HTTP clients.

use forge_orchestrator::clients::{ClientError, ClientResult};
use reqwest::{Client, Response};
use std::time::Duration;

pub(crate) fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("forge-clients/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

pub(crate) fn transport(service: &'static str, error: reqwest::Error) -> ClientError {
    ClientError::Transport {
        service,
        message: error.to_string(),
    }
}

/// Turn a non-success response into a rejection carrying status and
/// body.
pub(crate) async fn expect_success(
    service: &'static str,
    response: Response,
) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Rejected {
        service,
        message: format!("{status}: {body}"),
    })
}
