use std::sync::Arc;
use std::time::Duration;

use fitlife::api::{create_routes, AppState};
use fitlife::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder};
use fitlife::store::PgStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if config.is_production() && config.jwt_secret.starts_with("your-secret-key") {
        warn!("JWT_SECRET is not set; using the development default in production");
    }

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    if config.seed_database {
        DatabaseSeeder::new(pool.clone()).seed_all().await?;
    }

    let store = Arc::new(PgStore::new(pool));
    let shutdown = CancellationToken::new();

    let state = AppState::new(
        store.clone(),
        store,
        &config.jwt_secret,
        config.reminder_poll_interval,
        shutdown.clone(),
    );

    let auth_listener = state
        .reminders
        .spawn_listener(state.auth_service.subscribe());

    let sweeper = state.sessions.spawn_sweeper(
        config.session_idle_timeout,
        SWEEP_PERIOD,
        shutdown.clone(),
    );

    let sessions = state.sessions.clone();
    let app = create_routes(state);

    let listener = TcpListener::bind(config.server_address()).await?;
    info!(
        environment = %config.environment,
        "FitLife server starting on http://{}",
        config.server_address()
    );
    info!("Health check available at http://{}/health", config.server_address());

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
            signal_token.cancel();
            sessions.close_all().await;
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = auth_listener.await {
        warn!("Auth event listener ended abnormally: {}", e);
    }
    if let Err(e) = sweeper.await {
        warn!("Session sweeper ended abnormally: {}", e);
    }

    Ok(())
}
