//! Application builder: wires router, middleware and state into an Axum app.

use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use bookstore_core::config::AppConfig;
use bookstore_core::error::{AppError, ErrorKind};
use bookstore_core::result::AppResult;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state).layer(cors)
}

/// Runs the bookstore API server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting bookstore API v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Validate configuration ───────────────────────────
    config.validate()?;

    // ── Step 2: Open the user store ──────────────────────────────
    tracing::info!(
        "Opening user store (provider: {:?})...",
        config.database.provider
    );
    let user_repo = bookstore_database::open_user_repository(&config.database).await?;

    // ── Step 3: Wire services ────────────────────────────────────
    let state = AppState::new(config.clone(), user_repo);

    // ── Step 4: Resolve the avatar directory ─────────────────────
    let avatar_dir = state.avatar_service.store().resolver().resolve().await?;
    tracing::info!(
        "Serving avatars from '{}' at '{}'",
        avatar_dir.display(),
        config.storage.avatars.normalized_prefix()
    );

    // ── Step 5: Bind and serve ───────────────────────────────────
    let app = build_app(state);
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;
    tracing::info!("Bookstore API listening on {}", addr);

    serve_until_shutdown(
        listener,
        app,
        Duration::from_secs(config.server.shutdown_grace_seconds),
    )
    .await?;

    tracing::info!("Bookstore API shut down gracefully");
    Ok(())
}

/// Serve `app` until a shutdown signal, then give in-flight requests `grace`
/// to finish.
pub(crate) async fn serve_until_shutdown(
    listener: TcpListener,
    app: Router,
    grace: Duration,
) -> AppResult<()> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining in-flight requests...");
        let _ = shutdown_tx.send(true);
    });

    let deadline = async move {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server.into_future() => result.map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Server error", e)
        }),
        _ = deadline => {
            tracing::warn!(
                "Graceful shutdown exceeded {}s, dropping remaining connections",
                grace.as_secs()
            );
            Ok(())
        }
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
