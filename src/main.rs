// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use order_dashboard::application::dashboard_service::MetricsDashboard;
use order_dashboard::infrastructure::config::load_dashboard_config;
use order_dashboard::infrastructure::http_source::HttpMetricsSource;
use order_dashboard::infrastructure::ws_feed::WebSocketFeed;
use order_dashboard::presentation::app_state::AppState;
use order_dashboard::presentation::handlers::{get_dashboard, health_check, switch_interval};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create sources (infrastructure layer)
    let source = Arc::new(HttpMetricsSource::new(&config.analytics, &config.orders)?);
    let feed = Arc::new(WebSocketFeed::new(config.realtime.url.clone()));

    // Create dashboard (application layer)
    let dashboard = Arc::new(MetricsDashboard::new(source, feed, config.display.clone()));

    // Initial load runs in the background; the view reports `loading` until it settles
    tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.initialize().await }
    });

    let state = Arc::new(AppState {
        dashboard: dashboard.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/interval", post(switch_interval))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting order-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    dashboard.shutdown().await;
    tracing::info!("order-dashboard stopped");

    Ok(())
}
