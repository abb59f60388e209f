//! Monitor command - Sentiment sweeps without the HTTP server.

use std::sync::Arc;

use tokio::sync::watch;

use crate::cli::args::{MonitorAction, MonitorArgs};
use crate::commands::serve::shutdown_signal;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs::SentimentMonitor;
use crate::services::{ServiceContainer, Services};

/// Execute the monitor command
pub async fn execute(args: MonitorArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let services = Services::from_connection(db.get_connection(), config.clone())?;

    match args.action {
        MonitorAction::List => list_companies(&services).await,
        MonitorAction::Once => {
            let monitor = build_monitor(&services, &config).await;
            let report = monitor.run_once().await?;
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| AppError::internal(format!("Failed to encode report: {}", e)))?;
            println!("{}", json);
            Ok(())
        }
        MonitorAction::Run => {
            let monitor = Arc::new(build_monitor(&services, &config).await);
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let task = tokio::spawn(monitor.run(shutdown_rx));

            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
            task.await
                .map_err(|e| AppError::internal(format!("Sentiment monitor task failed: {}", e)))
        }
    }
}

/// Monitor over the configured services. Sweeps take the Redis lock when
/// Redis is reachable and run unguarded otherwise.
async fn build_monitor(services: &Services, config: &Config) -> SentimentMonitor {
    let monitor = SentimentMonitor::new(
        services.monitoring(),
        services.sentiment(),
        config.monitor.clone(),
    );

    match Cache::try_connect(config).await {
        Ok(cache) => monitor.with_lock(cache),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, sweeping without the lock");
            monitor
        }
    }
}

async fn list_companies(services: &Services) -> AppResult<()> {
    let companies = services.monitoring().list().await?;
    if companies.is_empty() {
        println!("No monitored companies");
        return Ok(());
    }

    for company in companies {
        let checked = company
            .last_checked_at
            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!("{}\tlast checked {}", company.name, checked);
    }
    Ok(())
}
