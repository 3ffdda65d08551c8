/// Static settings the orchestrator needs to compute URLs and job
/// payloads. Loaded from the environment by the service binary.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Declarative ref passed through to every job dispatch.
    pub env_ref: String,
    /// Base URI under which workbenches and deployed services are
    /// exposed, e.g. `https://forge.example.com`.
    pub base_uri: String,
    /// Git organization owning managed repositories.
    pub git_org_name: String,
    /// Git host base URI, with trailing slash, e.g.
    /// `https://github.example.com/`.
    pub git_org_uri: String,
    /// Directory role whose members get security-config review
    /// notifications.
    pub admin_role: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            env_ref: "main".to_string(),
            base_uri: "https://forge.example.com".to_string(),
            git_org_name: "forge-projects".to_string(),
            git_org_uri: "https://github.example.com/".to_string(),
            admin_role: "WorkspaceAdmin".to_string(),
        }
    }
}
