//! Backend entry-point: loads settings, prepares the database and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bookshelf::config::AppSettings;
use bookshelf::inbound::http::health::HealthState;
use bookshelf::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use bookshelf::outbound::open_library::OpenLibraryHttpSource;
use bookshelf::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, create_server};

fn io_error(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(error.to_string())
}

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

    let settings = AppSettings::load().map_err(io_error)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io_error)?;
    info!(fingerprint = %key_fingerprint(&session.key), "session key loaded");

    let database_url = settings.database_url().map_err(io_error)?;
    if settings.run_migrations {
        run_pending_migrations(&database_url)
            .await
            .map_err(io_error)?;
    }
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(io_error)?;

    let source = OpenLibraryHttpSource::new(
        settings.open_library_base_url().map_err(io_error)?,
        settings.http_timeout(),
    )
    .map_err(io_error)?;
    let bind_addr = settings.bind_addr().map_err(io_error)?;
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        pool,
        Arc::new(source),
    )
    .with_cover_urls(settings.cover_urls());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; draining");
            health_state.mark_unhealthy();
            handle.stop(true).await;
        }
    });

    server.await
}
