//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Language model, web search and scraping clients
//! - Caching, rate limiting and locks (Redis)
//! - Chart rendering
//! - Unit of Work for repository access

pub mod cache;
pub mod charts;
pub mod db;
pub mod llm;
pub mod repositories;
pub mod scraper;
pub mod search;
pub mod unit_of_work;

pub use cache::{Cache, LockGuard};
pub use db::{Database, Migrator};
pub use llm::{ChatCompletionsClient, LanguageModel};
pub use repositories::{
    AnalysisRepository, AnalysisStore, ComparisonRepository, ComparisonStore, EphemeralStore,
    MonitoredCompanyRepository, MonitoredCompanyStore, SentimentRepository, SentimentStore,
    UserRepository, UserStore,
};
pub use scraper::{HttpScraper, PageScraper};
pub use search::{CustomSearchClient, SearchHit, WebSearch};
pub use unit_of_work::{Persistence, RepositorySet, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use llm::MockLanguageModel;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAnalysisRepository, MockComparisonRepository, MockMonitoredCompanyRepository,
    MockSentimentRepository, MockUserRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use scraper::MockPageScraper;
#[cfg(any(test, feature = "test-utils"))]
pub use search::MockWebSearch;
