//! Persistence for completed analyses.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::to_json;
use super::entities::user_analysis::{self, ActiveModel, Entity as AnalysisEntity};
use crate::domain::{NewAnalysis, UserAnalysis};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    async fn create(&self, analysis: NewAnalysis) -> AppResult<UserAnalysis>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserAnalysis>>;

    /// Page of a user's analyses, newest first, with the total count
    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UserAnalysis>, u64)>;

    /// Most recent analysis of `company_key` owned by `user_id`
    async fn latest_for_company(
        &self,
        user_id: Uuid,
        company_key: &str,
    ) -> AppResult<Option<UserAnalysis>>;

    /// Delete by ID. NotFound when nothing was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct AnalysisStore {
    db: DatabaseConnection,
}

impl AnalysisStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnalysisRepository for AnalysisStore {
    async fn create(&self, analysis: NewAnalysis) -> AppResult<UserAnalysis> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(analysis.user_id),
            company_name: Set(analysis.company_name),
            company_key: Set(analysis.company_key),
            source: Set(analysis.source.as_str().to_string()),
            document_name: Set(analysis.document_name),
            report: Set(to_json(&analysis.report)?),
            charts: Set(to_json(&analysis.charts)?),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        UserAnalysis::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserAnalysis>> {
        AnalysisEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(UserAnalysis::try_from)
            .transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UserAnalysis>, u64)> {
        let paginator = AnalysisEntity::find()
            .filter(user_analysis::Column::UserId.eq(user_id))
            .order_by_desc(user_analysis::Column::CreatedAt)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page() - 1).await?;

        let items = models
            .into_iter()
            .map(UserAnalysis::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn latest_for_company(
        &self,
        user_id: Uuid,
        company_key: &str,
    ) -> AppResult<Option<UserAnalysis>> {
        AnalysisEntity::find()
            .filter(user_analysis::Column::UserId.eq(user_id))
            .filter(user_analysis::Column::CompanyKey.eq(company_key))
            .order_by_desc(user_analysis::Column::CreatedAt)
            .one(&self.db)
            .await?
            .map(UserAnalysis::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = AnalysisEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
