use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod models;
mod repositories;
mod routes;
mod services;
mod state;

use auth::{JwtConfig, TokenAuthority, repositories::PgUserRepository, seeder::seed_users};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting income API service");

    let app_config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let users = Arc::new(PgUserRepository::new(pool.clone()));
    if app_config.skip_seeder {
        info!("Skipping user seeder");
    } else {
        let seeded = seed_users(users.as_ref(), &app_config.seed_file).await?;
        info!("Seeded {} users from {}", seeded, app_config.seed_file);
    }

    let token_authority = TokenAuthority::new(JwtConfig::from_env()?)?;

    // Held until shutdown so the compaction job keeps running
    let mut scheduler = token_authority
        .revocations()
        .start_compaction(token_authority.compaction_schedule())
        .await?;

    let app_state = AppState::from_pool(pool, token_authority, users);
    let app = routes::create_router(app_state);

    let address = format!("0.0.0.0:{}", app_config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = scheduler.shutdown().await {
        warn!("Failed to stop revocation compaction: {}", e);
    }
    info!("API service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
