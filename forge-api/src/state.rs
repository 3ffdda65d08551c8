use forge_orchestrator::{Clients, OrchestratorConfig, WorkspaceOrchestrator, WorkspaceStore};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: WorkspaceOrchestrator,
}

impl AppState {
    pub fn new(pool: SqlitePool, clients: Clients, config: OrchestratorConfig) -> Self {
        Self {
            orchestrator: WorkspaceOrchestrator::new(WorkspaceStore::new(pool), clients, config),
        }
    }
}
