use forge_orchestrator::OrchestratorConfig;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_bind_addr() -> String {
    std::env::var("FORGE_API_BIND").unwrap_or_else(|_| "0.0.0.0:3121".to_string())
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("FORGE_API_DB_PATH") {
        return PathBuf::from(path);
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".forge").join("api").join("forge.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Orchestrator settings from the environment, falling back to
    /// the library defaults.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::default();
        if let Ok(env_ref) = std::env::var("FORGE_ENV_REF") {
            config.env_ref = env_ref;
        }
        if let Ok(base_uri) = std::env::var("FORGE_BASE_URI") {
            config.base_uri = base_uri;
        }
        if let Ok(org) = std::env::var("FORGE_GIT_ORG") {
            config.git_org_name = org;
        }
        if let Ok(uri) = std::env::var("FORGE_GIT_ORG_URI") {
            config.git_org_uri = uri;
        }
        if let Ok(role) = std::env::var("FORGE_ADMIN_ROLE") {
            config.admin_role = role;
        }
        config
    }
}
