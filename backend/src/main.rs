//! Backend entry-point: loads settings, wires adapters and serves HTTP.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use alias_relay::inbound::http::health::HealthState;
use alias_relay::inbound::http::session_config::{BuildMode, session_settings_from_env};
use alias_relay::outbound::persistence::DbPool;
use server::{AppSettings, ServerConfig, create_server, drain_on_signal};

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

    let settings = AppSettings::load_from_process().map_err(std::io::Error::other)?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let recipient_limit = settings.recipient_limit().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_recipient_limit(recipient_limit);

    match settings.pool_config() {
        Some(pool_config) => {
            let pool = DbPool::new(pool_config)
                .await
                .map_err(|err| std::io::Error::other(err.into_message()))?;
            config = config.with_db_pool(pool);
        }
        None => warn!("RELAY_DATABASE_URL not set; serving fixture responses"),
    }

    info!(%bind_addr, limit = %recipient_limit, "starting server");
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    drain_on_signal(server.handle(), health_state);
    server.await
}
