//! Persistence for the monitored company list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::monitored_company::{self, ActiveModel, Entity as MonitoredEntity};
use super::unique_violation;
use crate::domain::MonitoredCompany;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MonitoredCompanyRepository: Send + Sync {
    /// Conflict when the key is already monitored
    async fn create(
        &self,
        name: String,
        company_key: String,
        added_by: Option<Uuid>,
    ) -> AppResult<MonitoredCompany>;

    async fn find_by_key(&self, company_key: &str) -> AppResult<Option<MonitoredCompany>>;

    /// All monitored companies ordered by name
    async fn list(&self) -> AppResult<Vec<MonitoredCompany>>;

    /// Returns false when nothing matched
    async fn delete_by_key(&self, company_key: &str) -> AppResult<bool>;

    async fn touch_checked(&self, company_key: &str, at: DateTime<Utc>) -> AppResult<()>;
}

pub struct MonitoredCompanyStore {
    db: DatabaseConnection,
}

impl MonitoredCompanyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MonitoredCompanyRepository for MonitoredCompanyStore {
    async fn create(
        &self,
        name: String,
        company_key: String,
        added_by: Option<Uuid>,
    ) -> AppResult<MonitoredCompany> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            company_key: Set(company_key),
            added_by: Set(added_by),
            created_at: Set(Utc::now()),
            last_checked_at: Set(None),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if unique_violation(&e) {
                AppError::conflict(format!("Monitored company '{}'", name))
            } else {
                AppError::from(e)
            }
        })?;
        Ok(MonitoredCompany::from(model))
    }

    async fn find_by_key(&self, company_key: &str) -> AppResult<Option<MonitoredCompany>> {
        let result = MonitoredEntity::find()
            .filter(monitored_company::Column::CompanyKey.eq(company_key))
            .one(&self.db)
            .await?;

        Ok(result.map(MonitoredCompany::from))
    }

    async fn list(&self) -> AppResult<Vec<MonitoredCompany>> {
        let models = MonitoredEntity::find()
            .order_by_asc(monitored_company::Column::CompanyKey)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(MonitoredCompany::from).collect())
    }

    async fn delete_by_key(&self, company_key: &str) -> AppResult<bool> {
        let result = MonitoredEntity::delete_many()
            .filter(monitored_company::Column::CompanyKey.eq(company_key))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn touch_checked(&self, company_key: &str, at: DateTime<Utc>) -> AppResult<()> {
        MonitoredEntity::update_many()
            .col_expr(
                monitored_company::Column::LastCheckedAt,
                sea_orm::sea_query::Expr::value(Some(at)),
            )
            .filter(monitored_company::Column::CompanyKey.eq(company_key))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
