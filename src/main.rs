//! Lane runner game server.
//!
//! Serves `/ws` for players and `/health` for monitoring, while one background
//! task advances the shared world at a fixed tick rate.

mod app;
mod config;
mod game;
mod http;
mod util;
mod ws;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::AppState;
use crate::config::Config;
use crate::http::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    info!(
        addr = %config.server_addr,
        tick_ms = config.game.tick_period.as_millis() as u64,
        cooldown_secs = config.game.cooldown.as_secs(),
        outbox_capacity = config.game.outbox_capacity,
        "Lane runner starting"
    );

    let state = AppState::new(config);
    let simulation = tokio::spawn(state.simulation().run());

    let listener = TcpListener::bind(state.config.server_addr).await?;
    info!(addr = %listener.local_addr()?, "Accepting players on /ws");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    simulation.abort();
    info!("Lane runner stopped");
    Ok(())
}

/// `RUST_LOG` wins over `LOG_LEVEL` when both are set
fn init_tracing(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM. A handler that fails to install is logged
/// and never fires, leaving the other one in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, draining connections"),
        _ = terminate => info!("SIGTERM received, draining connections"),
    }
}
