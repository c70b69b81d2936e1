use std::sync::Arc;

use axum::{routing::post, Router};
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::platform::github::GitHubPlatform;
use crate::platform::Platform;

pub struct AppState {
    pub config: AppConfig,
    pub platform: Arc<dyn Platform>,
}

impl AppState {
    pub fn new(config: AppConfig) -> crate::error::Result<Self> {
        let platform = GitHubPlatform::new(&config.github)?;
        Ok(Self::with_platform(config, Arc::new(platform)))
    }

    pub fn with_platform(config: AppConfig, platform: Arc<dyn Platform>) -> Self {
        Self { config, platform }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhooks/github", post(crate::webhook::handler::handle_webhook))
        .route("/health", axum::routing::get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Resolve on SIGINT or SIGTERM. In-flight sweeps are not awaited.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
