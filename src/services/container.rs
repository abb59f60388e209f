//! Service Container - Centralized service access.
//!
//! Wires every service over one Unit of Work and one set of outbound
//! clients (language model, web search, scraper), and hands them out as
//! trait objects.

use std::sync::Arc;

use super::{
    AnalysisService, Analyzer, AuthService, Authenticator, Comparator, ComparisonService,
    MonitorRegistry, MonitoringService, SentimentService, SentimentTracker,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{
    ChatCompletionsClient, CustomSearchClient, HttpScraper, LanguageModel, PageScraper,
    Persistence, UnitOfWork, WebSearch,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn analyses(&self) -> Arc<dyn AnalysisService>;

    fn comparisons(&self) -> Arc<dyn ComparisonService>;

    fn monitoring(&self) -> Arc<dyn MonitoringService>;

    fn sentiment(&self) -> Arc<dyn SentimentService>;
}

/// Outbound clients shared by the analysis services
#[derive(Clone)]
pub struct Backends {
    pub llm: Arc<dyn LanguageModel>,
    pub search: Arc<dyn WebSearch>,
    pub scraper: Arc<dyn PageScraper>,
}

impl Backends {
    /// HTTP clients built from configuration. Missing API keys surface as
    /// upstream errors on first use, not here.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            llm: Arc::new(ChatCompletionsClient::new(config.llm.clone())?),
            search: Arc::new(CustomSearchClient::new(config.search.clone())?),
            scraper: Arc::new(HttpScraper::new(&config.search)?),
        })
    }
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    analysis_service: Arc<dyn AnalysisService>,
    comparison_service: Arc<dyn ComparisonService>,
    monitoring_service: Arc<dyn MonitoringService>,
    sentiment_service: Arc<dyn SentimentService>,
}

impl Services {
    /// Create a service container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        analysis_service: Arc<dyn AnalysisService>,
        comparison_service: Arc<dyn ComparisonService>,
        monitoring_service: Arc<dyn MonitoringService>,
        sentiment_service: Arc<dyn SentimentService>,
    ) -> Self {
        Self {
            auth_service,
            analysis_service,
            comparison_service,
            monitoring_service,
            sentiment_service,
        }
    }

    /// Wire every service over `uow` and `backends`.
    pub fn build<U: UnitOfWork + 'static>(uow: Arc<U>, config: Config, backends: Backends) -> Self {
        let sentiment_service: Arc<dyn SentimentService> = Arc::new(SentimentTracker::new(
            uow.clone(),
            backends.llm.clone(),
            backends.search.clone(),
        ));
        let analysis_service: Arc<dyn AnalysisService> = Arc::new(Analyzer::new(
            uow.clone(),
            backends.llm.clone(),
            backends.search.clone(),
            backends.scraper.clone(),
            sentiment_service.clone(),
        ));
        let comparison_service = Arc::new(Comparator::new(
            uow.clone(),
            backends.llm.clone(),
            analysis_service.clone(),
        ));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            analysis_service,
            comparison_service,
            monitoring_service: Arc::new(MonitorRegistry::new(uow)),
            sentiment_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> AppResult<Self> {
        let backends = Backends::from_config(&config)?;
        Ok(Self::build(Arc::new(Persistence::new(db)), config, backends))
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn analyses(&self) -> Arc<dyn AnalysisService> {
        self.analysis_service.clone()
    }

    fn comparisons(&self) -> Arc<dyn ComparisonService> {
        self.comparison_service.clone()
    }

    fn monitoring(&self) -> Arc<dyn MonitoringService> {
        self.monitoring_service.clone()
    }

    fn sentiment(&self) -> Arc<dyn SentimentService> {
        self.sentiment_service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backends_from_config() {
        assert!(Backends::from_config(&Config::for_tests()).is_ok());
    }
}
