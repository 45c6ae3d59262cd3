//! Backend entry-point: loads settings, picks the storage backend and serves
//! the REST API.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipes::inbound::http::health::HealthState;
use recipes::inbound::http::session_config::{BuildMode, session_settings_from_env};
use recipes::inbound::http::state::HttpState;
use recipes::outbound::media::CapStdImageStore;
use recipes::outbound::memory::InMemoryStore;
use recipes::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use recipes::server::{
    Collaborators, ServerConfig, create_server, diesel_http_state, memory_http_state,
};
use recipes::settings::AppSettings;

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

    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let media_root = settings.media_root();
    let images = CapStdImageStore::open(&media_root)?;
    info!(path = %media_root.display(), "media root ready");
    let collaborators = Collaborators::production(Arc::new(images));
    let http_state = build_state(&settings, collaborators).await?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(session.into(), settings.bind_addr(), http_state);
    let server = create_server(health_state, config)?;
    server.await
}

async fn build_state(
    settings: &AppSettings,
    collaborators: Collaborators,
) -> std::io::Result<HttpState> {
    let Some(database_url) = settings.database_url() else {
        warn!("RECIPES_DATABASE_URL is not set; data is kept in memory and lost on exit");
        return Ok(memory_http_state(&InMemoryStore::new(), collaborators));
    };

    if settings.run_migrations() {
        let applied = run_migrations(database_url.to_owned())
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database schema up to date");
    }
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(std::io::Error::other)?;
    Ok(diesel_http_state(&pool, collaborators))
}
