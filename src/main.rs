use anyhow::Context;
use tracing_subscriber::EnvFilter;

use spend_dashboard::config::AppConfig;
use spend_dashboard::database::DatabaseManager;
use spend_dashboard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;
    tracing::info!("Starting spend dashboard in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    let bind_addr = config.bind_addr();
    let state = AppState::with_pool(config, pool);
    state
        .ensure_schema()
        .await
        .context("failed to initialize the schema")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Spend dashboard listening on http://{}", bind_addr);

    axum::serve(listener, spend_dashboard::app(state)).await?;
    Ok(())
}
