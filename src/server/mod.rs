//! HTTP transport.
//!
//! | Route                  | Purpose                                           |
//! |------------------------|---------------------------------------------------|
//! | `POST /predict`        | classify `{"review": "..."}`                      |
//! | `GET /health`          | liveness plus model and lexicon status            |
//! | `GET /debug/resources` | search path listing, when debug endpoints are on  |

pub mod handlers;
pub mod middleware;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tokio::net::TcpListener;

use crate::config::SentinelConfig;
use crate::error::{Result, SentinelError};
use crate::service::ServiceContext;

pub use state::{AppState, Lifecycle};

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/predict", post(handlers::predict_handler))
        .route("/health", get(handlers::health_handler));
    if state.server.enable_debug_endpoints {
        router = router.route("/debug/resources", get(handlers::debug_resources_handler));
    }

    router
        .layer(from_fn_with_state(state.clone(), middleware::timeout_middleware))
        .layer(from_fn(middleware::request_context_middleware))
        .layer(DefaultBodyLimit::max(state.server.max_body_bytes))
        .with_state(state)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("cannot register unix signal handlers, waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown signal received");
}

/// Bootstrap the service context, then bind and serve until a shutdown signal.
///
/// The listener is bound only after the context is installed, so a process
/// that fails to load never accepts a connection.
pub async fn serve(config: SentinelConfig) -> Result<()> {
    let state = AppState::new(
        config.server.clone(),
        config.resources.search_paths.clone(),
    );

    let bootstrap_config = config.clone();
    let context = tokio::task::spawn_blocking(move || ServiceContext::bootstrap(&bootstrap_config))
        .await
        .map_err(|e| SentinelError::other(format!("bootstrap task failed: {e}")))??;
    state.install(context)?;

    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %config.server.bind, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
