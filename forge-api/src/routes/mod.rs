pub mod health;
pub mod status_updates;
pub mod workspaces;

use crate::{auth::auth_middleware, state::AppState};
use axum::{middleware, Router};
use forge_orchestrator::{Clients, OrchestratorConfig};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub async fn create_app(
    pool: SqlitePool,
    clients: Clients,
    config: OrchestratorConfig,
) -> anyhow::Result<Router> {
    let state = AppState::new(pool, clients, config);

    // Allow CORS for local development (frontend on different port)
    let cors = CorsLayer::permissive();

    let app = Router::new()
        .merge(health::routes()) // Health routes don't need auth
        .merge(status_updates::routes()) // Called by the job system, not end users
        .merge(workspaces::routes().layer(middleware::from_fn(auth_middleware)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
