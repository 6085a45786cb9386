//! multiplayer-sessions server entry point.
//!
//! Runs the session driver over the loopback LAN backend and serves the
//! REST and WebSocket control surface.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use multiplayer_sessions::api;
use multiplayer_sessions::app_state::AppState;
use multiplayer_sessions::config::{LogFormat, SessionsConfig};
use multiplayer_sessions::domain::{LocalPlayerId, OutcomeNotifier};
use multiplayer_sessions::driver::SessionDriver;
use multiplayer_sessions::gateway::{LanDirectory, LoopbackGateway};
use multiplayer_sessions::service::{CoordinatorOptions, MenuFlow, SessionCoordinator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = SessionsConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        session = %config.session_name,
        build_id = config.build_unique_id,
        "starting multiplayer-sessions"
    );

    // Backend
    let gateway = LoopbackGateway::new(LanDirectory::new())
        .with_host_address(config.loopback_host_address.clone())
        .with_build_id(config.build_unique_id);

    // Coordinator and menu
    let notifier = OutcomeNotifier::new(config.event_bus_capacity);
    let local_player = LocalPlayerId::new();
    let coordinator = SessionCoordinator::new(
        gateway,
        notifier.clone(),
        CoordinatorOptions {
            session_name: config.session_name.clone(),
            local_player,
            build_unique_id: config.build_unique_id,
            operation_timeout: config.operation_timeout(),
        },
    );
    let menu = MenuFlow::new(config.menu.clone()).context("invalid menu configuration")?;
    tracing::info!(player = %local_player, lan = coordinator.is_lan(), "coordinator ready");

    // Control thread
    let (driver, driver_task) = SessionDriver::spawn(coordinator, menu, config.tick_interval());

    let app_state = AppState {
        driver,
        notifier,
        menu: config.menu.clone(),
    };
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    // The router held the last driver handle.
    let _ = driver_task.await;
    Ok(())
}
