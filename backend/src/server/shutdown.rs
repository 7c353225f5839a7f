//! Graceful shutdown: fail liveness first, then drain in-flight requests.

use actix_web::dev::ServerHandle;
use actix_web::web;
use tracing::{info, warn};

use alias_relay::inbound::http::health::HealthState;

/// Stop routing new traffic to this instance and wait for the server to drain.
pub async fn drain(handle: &ServerHandle, health_state: &HealthState) {
    health_state.mark_unhealthy();
    handle.stop(true).await;
}

/// Drain the server once SIGINT or SIGTERM arrives.
pub fn drain_on_signal(handle: ServerHandle, health_state: web::Data<HealthState>) {
    actix_web::rt::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received; draining");
        drain(&handle, &health_state).await;
    });
}

async fn ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                () = ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(error) => {
            warn!(%error, "SIGTERM handler unavailable");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    ctrl_c().await;
}
