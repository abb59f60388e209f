//! Persistence for comparison results.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::comparison_result::{self, ActiveModel, Entity as ComparisonEntity};
use super::entities::to_json;
use crate::domain::{ComparisonResult, NewComparison};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ComparisonRepository: Send + Sync {
    async fn create(&self, comparison: NewComparison) -> AppResult<ComparisonResult>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ComparisonResult>>;

    /// Page of a user's comparisons, newest first, with the total count
    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<ComparisonResult>, u64)>;
}

pub struct ComparisonStore {
    db: DatabaseConnection,
}

impl ComparisonStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ComparisonRepository for ComparisonStore {
    async fn create(&self, comparison: NewComparison) -> AppResult<ComparisonResult> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(comparison.user_id),
            companies: Set(to_json(&comparison.companies)?),
            metrics: Set(to_json(&comparison.metrics)?),
            insights: Set(comparison.insights),
            charts: Set(to_json(&comparison.charts)?),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        ComparisonResult::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ComparisonResult>> {
        ComparisonEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(ComparisonResult::try_from)
            .transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<ComparisonResult>, u64)> {
        let paginator = ComparisonEntity::find()
            .filter(comparison_result::Column::UserId.eq(user_id))
            .order_by_desc(comparison_result::Column::CreatedAt)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page() - 1).await?;

        let items = models
            .into_iter()
            .map(ComparisonResult::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }
}
