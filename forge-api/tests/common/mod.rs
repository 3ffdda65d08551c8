//! Common test utilities and helpers for forge-api tests

#![allow(dead_code)]

use axum::Router;
use forge_orchestrator::mock::MockClients;
use forge_orchestrator::test_utils::{provision_request, user};
use forge_orchestrator::{
    OrchestratorConfig, RecipeId, Workspace, WorkspaceOrchestrator, WorkspaceStore,
};
use sqlx::SqlitePool;

/// Helper to create an in-memory test database with migrations
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    // Run migrations from forge-orchestrator
    sqlx::migrate!("../forge-orchestrator/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Create a test app over recording mock clients
pub async fn create_test_app(pool: SqlitePool) -> (Router, MockClients) {
    let mocks = MockClients::new();
    let app = forge_api::create_app(pool, mocks.clients(), OrchestratorConfig::default())
        .await
        .expect("Failed to create test app");
    (app, mocks)
}

/// Fixture: provision a project and return the owner workspace
pub async fn fixture_project(
    pool: &SqlitePool,
    mocks: &MockClients,
    project: &str,
    owner_id: &str,
) -> Workspace {
    let orchestrator = WorkspaceOrchestrator::new(
        WorkspaceStore::new(pool.clone()),
        mocks.clients(),
        OrchestratorConfig::default(),
    );

    let result = orchestrator
        .provision_project(provision_request(project, RecipeId::Default, owner_id))
        .await
        .expect("Failed to provision fixture project");
    assert!(result.outcome.is_success(), "fixture provisioning failed");
    result.workspace.expect("fixture workspace missing")
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: axum::response::Response) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}

/// Helper to create authenticated request headers
pub fn auth_headers(user_id: &str) -> Vec<(&'static str, &str)> {
    vec![("x-forge-user", user_id)]
}

pub fn test_user(id: &str) -> forge_orchestrator::UserInfo {
    user(id)
}
