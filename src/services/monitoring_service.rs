//! Monitoring service - the list of companies the sentiment monitor sweeps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CompanyName, MonitoredCompany};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MonitoringService: Send + Sync {
    /// Start monitoring `name`. Conflict when already monitored.
    async fn add(&self, name: &str, added_by: Option<Uuid>) -> AppResult<MonitoredCompany>;

    /// Stop monitoring `name`. NotFound when it was not monitored.
    async fn remove(&self, name: &str) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<MonitoredCompany>>;

    /// Record a successful sweep of `name` at `at`.
    async fn mark_checked(&self, name: &str, at: DateTime<Utc>) -> AppResult<()>;
}

/// Concrete implementation of MonitoringService.
pub struct MonitorRegistry<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> MonitorRegistry<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> MonitoringService for MonitorRegistry<U> {
    async fn add(&self, name: &str, added_by: Option<Uuid>) -> AppResult<MonitoredCompany> {
        let name = CompanyName::parse(name)?;
        let repo = self.uow.monitored_companies();

        if repo.find_by_key(name.key()).await?.is_some() {
            return Err(AppError::conflict(format!("Monitored company '{}'", name)));
        }

        let company = repo
            .create(name.as_str().to_string(), name.key().to_string(), added_by)
            .await?;
        tracing::info!(company = %company.name, "Company added to monitoring");
        Ok(company)
    }

    async fn remove(&self, name: &str) -> AppResult<()> {
        let name = CompanyName::parse(name)?;
        if !self.uow.monitored_companies().delete_by_key(name.key()).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(company = %name, "Company removed from monitoring");
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<MonitoredCompany>> {
        self.uow.monitored_companies().list().await
    }

    async fn mark_checked(&self, name: &str, at: DateTime<Utc>) -> AppResult<()> {
        let name = CompanyName::parse(name)?;
        self.uow
            .monitored_companies()
            .touch_checked(name.key(), at)
            .await
    }
}
