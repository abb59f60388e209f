//! Unit of Work: one place to reach every repository.
//!
//! Services depend on `UnitOfWork` instead of individual stores, so a single
//! connection is shared and tests can swap the whole persistence layer.
//! Every write in this application touches one row, so no transaction
//! scope is exposed.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    AnalysisRepository, AnalysisStore, ComparisonRepository, ComparisonStore, EphemeralStore,
    MonitoredCompanyRepository, MonitoredCompanyStore, SentimentRepository, SentimentStore,
    UserRepository, UserStore,
};

/// Repository access for the service layer.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn analyses(&self) -> Arc<dyn AnalysisRepository>;

    fn comparisons(&self) -> Arc<dyn ComparisonRepository>;

    fn monitored_companies(&self) -> Arc<dyn MonitoredCompanyRepository>;

    fn sentiment(&self) -> Arc<dyn SentimentRepository>;
}

/// SeaORM-backed UnitOfWork
pub struct Persistence {
    users: Arc<UserStore>,
    analyses: Arc<AnalysisStore>,
    comparisons: Arc<ComparisonStore>,
    monitored: Arc<MonitoredCompanyStore>,
    sentiment: Arc<SentimentStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            analyses: Arc::new(AnalysisStore::new(db.clone())),
            comparisons: Arc::new(ComparisonStore::new(db.clone())),
            monitored: Arc::new(MonitoredCompanyStore::new(db.clone())),
            sentiment: Arc::new(SentimentStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn analyses(&self) -> Arc<dyn AnalysisRepository> {
        self.analyses.clone()
    }

    fn comparisons(&self) -> Arc<dyn ComparisonRepository> {
        self.comparisons.clone()
    }

    fn monitored_companies(&self) -> Arc<dyn MonitoredCompanyRepository> {
        self.monitored.clone()
    }

    fn sentiment(&self) -> Arc<dyn SentimentRepository> {
        self.sentiment.clone()
    }
}

/// UnitOfWork over arbitrary repository implementations, used where no
/// database is available (one-off CLI analyses, tests).
pub struct RepositorySet {
    pub users: Arc<dyn UserRepository>,
    pub analyses: Arc<dyn AnalysisRepository>,
    pub comparisons: Arc<dyn ComparisonRepository>,
    pub monitored: Arc<dyn MonitoredCompanyRepository>,
    pub sentiment: Arc<dyn SentimentRepository>,
}

impl RepositorySet {
    /// Every repository backed by the same store.
    pub fn uniform<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + AnalysisRepository
            + ComparisonRepository
            + MonitoredCompanyRepository
            + SentimentRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            analyses: store.clone(),
            comparisons: store.clone(),
            monitored: store.clone(),
            sentiment: store,
        }
    }

    /// Nothing is persisted; creates echo their input.
    pub fn ephemeral() -> Self {
        Self::uniform(Arc::new(EphemeralStore))
    }
}

impl UnitOfWork for RepositorySet {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn analyses(&self) -> Arc<dyn AnalysisRepository> {
        self.analyses.clone()
    }

    fn comparisons(&self) -> Arc<dyn ComparisonRepository> {
        self.comparisons.clone()
    }

    fn monitored_companies(&self) -> Arc<dyn MonitoredCompanyRepository> {
        self.monitored.clone()
    }

    fn sentiment(&self) -> Arc<dyn SentimentRepository> {
        self.sentiment.clone()
    }
}
