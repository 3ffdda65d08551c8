//! HTTP implementations of the orchestrator's external-system traits.
//!
//! Each client wraps one platform service behind the corresponding
//! trait from forge-orchestrator. Transport problems surface as
//! [`ClientError::Transport`], non-success responses as
//! [`ClientError::Rejected`]. Only idempotent validation reads are
//! retried, once.
//!
//! [`ClientError::Transport`]: forge_orchestrator::clients::ClientError::Transport
//! [`ClientError::Rejected`]: forge_orchestrator::clients::ClientError::Rejected

pub mod config;

mod deployment;
mod directory;
mod gateway;
mod git;
mod http;
mod notify;
mod workbench;

pub use config::ClientsConfig;
pub use deployment::HttpDeploymentJob;
pub use directory::HttpUserDirectory;
pub use gateway::HttpGatewayRegistrar;
pub use git::HttpGitHost;
pub use notify::HttpNotificationPublisher;
pub use workbench::HttpWorkbenchProvisioner;

use forge_orchestrator::Clients;
use std::sync::Arc;

/// Wire up all six HTTP clients from one configuration.
pub fn build_clients(config: &ClientsConfig) -> anyhow::Result<Clients> {
    let client = http::build_http_client(config.timeout)?;

    Ok(Clients {
        git: Arc::new(HttpGitHost::new(
            client.clone(),
            config.git_base_url.clone(),
            config.git_org.clone(),
        )),
        workbench: Arc::new(HttpWorkbenchProvisioner::new(
            client.clone(),
            config.workbench_base_url.clone(),
        )),
        deployment: Arc::new(HttpDeploymentJob::new(
            client.clone(),
            config.deployment_base_url.clone(),
        )),
        gateway: Arc::new(HttpGatewayRegistrar::new(
            client.clone(),
            config.gateway_admin_url.clone(),
        )),
        notifications: Arc::new(HttpNotificationPublisher::new(
            client.clone(),
            config.notification_base_url.clone(),
        )),
        directory: Arc::new(HttpUserDirectory::new(
            client,
            config.directory_base_url.clone(),
        )),
    })
}
