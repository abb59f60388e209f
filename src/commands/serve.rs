//! Serve command - Starts the HTTP server and the sentiment monitor.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Connecting also runs pending migrations
    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!("Database connected");

    let cache = Cache::try_connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;
    let cache = Arc::new(cache);
    tracing::info!("Redis cache connected");

    let monitor_enabled = config.monitor.enabled;
    let app_state = AppState::from_config(db, cache, config.clone())?;
    let app = create_router(app_state.clone(), &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_task = if monitor_enabled {
        Some(tokio::spawn(app_state.monitor.clone().run(shutdown_rx)))
    } else {
        tracing::info!("Sentiment monitor disabled");
        None
    };

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)));

    // Stop the monitor whether or not the server exited cleanly
    let _ = shutdown_tx.send(true);
    if let Some(task) = monitor_task {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Sentiment monitor task ended abnormally");
        }
    }

    served?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler there is nothing to wait for
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
