//! Backend entry-point: loads settings, prepares storage, and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::settings::{AppSettings, BuildMode};
use server::{ServerConfig, create_server};
use skiclub::inbound::http::health::HealthState;
use skiclub::outbound::persistence::{DbPool, PoolConfig, run_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let mode = BuildMode::from_debug_assertions();
    let session = settings
        .session_settings(mode)
        .map_err(std::io::Error::other)?;
    let admin = settings
        .bootstrap_admin(mode)
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(session, bind_addr, admin);
    if let Some(database_url) = settings.database_url.clone() {
        let url = database_url.clone();
        let applied = tokio::task::spawn_blocking(move || run_migrations(&url))
            .await
            .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
            .map_err(std::io::Error::other)?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting server");
    let server = create_server(health_state, config).await?;
    server.await
}
