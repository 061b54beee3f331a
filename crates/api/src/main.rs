use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobroom_api::config::ServerConfig;
use jobroom_api::middleware::rate_limit;
use jobroom_api::router::build_app_router;
use jobroom_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobroom_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    tracing::info!(
        %addr,
        rate_limit_max = config.rate_limit_max_requests,
        rate_limit_window_secs = config.rate_limit_window_secs,
        "Loaded server configuration",
    );

    let state = AppState::new(config);
    let sweeper = rate_limit::start_purge(Arc::clone(&state.store));
    let app = build_app_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Job room gateway listening");

    // Connect info feeds the per-IP rate limit key.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // Upgraded chat connections outlive the HTTP server; close them now.
    let open = state.rooms.connection_count().await;
    tracing::info!(open, "HTTP server stopped, closing chat connections");
    state.rooms.shutdown_all().await;
    sweeper.abort();

    tracing::info!("Shutdown complete");
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Starting graceful shutdown");
}
