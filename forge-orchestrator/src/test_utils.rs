use crate::clients::DirectoryUser;
use crate::config::OrchestratorConfig;
use crate::mock::MockClients;
use crate::model::UserInfo;
use crate::orchestrator::WorkspaceOrchestrator;
use crate::provision::ProvisionRequest;
use crate::recipe::RecipeId;
use crate::store::WorkspaceStore;
use sqlx::SqlitePool;

/// Helper to create an in-memory test database with migrations applied
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Orchestrator wired to a fresh in-memory store and recording mocks.
pub async fn create_test_orchestrator() -> (WorkspaceOrchestrator, MockClients) {
    let pool = create_test_db().await;
    let mocks = MockClients::new();
    let orchestrator = WorkspaceOrchestrator::new(
        WorkspaceStore::new(pool),
        mocks.clients(),
        OrchestratorConfig::default(),
    );
    (orchestrator, mocks)
}

pub fn user(id: &str) -> UserInfo {
    UserInfo {
        id: id.to_string(),
        git_user_name: format!("git-{id}"),
        email: Some(format!("{id}@example.com")),
    }
}

pub fn admin_user(id: &str) -> DirectoryUser {
    DirectoryUser {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
    }
}

pub fn provision_request(project: &str, recipe: RecipeId, owner_id: &str) -> ProvisionRequest {
    ProvisionRequest {
        project_name: project.to_string(),
        recipe,
        repo_reference: None,
        resource: "medium".to_string(),
        owner: user(owner_id),
        collaborators: Vec::new(),
        pat: "token".to_string(),
    }
}
