//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Database};
use crate::jobs::SentimentMonitor;
use crate::services::{
    AnalysisService, AuthService, ComparisonService, MonitoringService, SentimentService,
    ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub analysis_service: Arc<dyn AnalysisService>,
    pub comparison_service: Arc<dyn ComparisonService>,
    pub monitoring_service: Arc<dyn MonitoringService>,
    pub sentiment_service: Arc<dyn SentimentService>,
    /// Sentiment monitor shared with the background loop; owns the skip list
    pub monitor: Arc<SentimentMonitor>,
    /// Redis cache
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// Builds the service container over the database and the configured
    /// outbound clients, and a monitor that sweeps under the Redis lock.
    pub fn from_config(database: Arc<Database>, cache: Arc<Cache>, config: Config) -> AppResult<Self> {
        let monitor_settings = config.monitor.clone();
        let container = Services::from_connection(database.get_connection(), config)?;

        let monitor = SentimentMonitor::new(
            container.monitoring(),
            container.sentiment(),
            monitor_settings,
        )
        .with_lock(cache.as_ref().clone());

        Ok(Self::new(&container, Arc::new(monitor), cache, database))
    }

    /// Create application state from an already-wired container.
    pub fn new(
        services: &dyn ServiceContainer,
        monitor: Arc<SentimentMonitor>,
        cache: Arc<Cache>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            analysis_service: services.analyses(),
            comparison_service: services.comparisons(),
            monitoring_service: services.monitoring(),
            sentiment_service: services.sentiment(),
            monitor,
            cache,
            database,
        }
    }
}
