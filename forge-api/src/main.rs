use anyhow::Result;
use forge_api::{create_app, Config};
use forge_clients::{build_clients, ClientsConfig};
use forge_orchestrator::db::{create_pool, run_migrations};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("forge_api=debug,forge_orchestrator=debug,forge_clients=debug,tower_http=debug")
        .init();

    info!("Starting forge-api service...");

    // Load configuration
    let config = Config::from_env();
    info!(
        "Configuration loaded: bind_addr={}, db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    // Create pool and run migrations
    let pool = create_pool(&config.db_path).await?;
    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Migrations complete");

    // Wire up the platform service clients
    let clients = build_clients(&ClientsConfig::from_env())?;

    // Create app
    let app = create_app(pool, clients, config.orchestrator_config()).await?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
