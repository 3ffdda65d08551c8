use std::time::Duration;

/// Base URLs of the platform services the orchestrator talks to.
#[derive(Debug, Clone)]
pub struct ClientsConfig {
    /// Git host admin API.
    pub git_base_url: String,
    /// Organization owning managed repositories.
    pub git_org: String,
    /// Workbench provisioning service.
    pub workbench_base_url: String,
    /// Deployment job dispatcher.
    pub deployment_base_url: String,
    /// API gateway admin endpoint.
    pub gateway_admin_url: String,
    /// Notification event bus.
    pub notification_base_url: String,
    /// User directory.
    pub directory_base_url: String,
    /// HTTP request timeout applied to every client.
    pub timeout: Duration,
}

impl ClientsConfig {
    /// Read service URLs from the environment, falling back to the
    /// in-cluster defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let overrides: [(&str, &mut String); 7] = [
            ("FORGE_GIT_URL", &mut config.git_base_url),
            ("FORGE_GIT_ORG", &mut config.git_org),
            ("FORGE_WORKBENCH_URL", &mut config.workbench_base_url),
            ("FORGE_DEPLOYER_URL", &mut config.deployment_base_url),
            ("FORGE_GATEWAY_ADMIN_URL", &mut config.gateway_admin_url),
            ("FORGE_NOTIFICATIONS_URL", &mut config.notification_base_url),
            ("FORGE_DIRECTORY_URL", &mut config.directory_base_url),
        ];
        for (var, slot) in overrides {
            if let Ok(value) = std::env::var(var) {
                *slot = value;
            }
        }
        config
    }
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            git_base_url: "http://git.forge-system.svc:3000".to_string(),
            git_org: "forge-projects".to_string(),
            workbench_base_url: "http://workbench.forge-system.svc:8080".to_string(),
            deployment_base_url: "http://deployer.forge-system.svc:8080".to_string(),
            gateway_admin_url: "http://gateway-admin.forge-system.svc:8001".to_string(),
            notification_base_url: "http://notifications.forge-system.svc:8080".to_string(),
            directory_base_url: "http://directory.forge-system.svc:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
