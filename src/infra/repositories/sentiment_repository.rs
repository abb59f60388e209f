//! Persistence for the sentiment time series.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::sentiment_data::{self, ActiveModel, Entity as SentimentEntity};
use super::entities::to_json;
use crate::domain::{NewSentimentPoint, SentimentPoint};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SentimentRepository: Send + Sync {
    async fn insert(&self, point: NewSentimentPoint) -> AppResult<SentimentPoint>;

    /// The most recent `limit` points for `company_key`, oldest first
    async fn history(&self, company_key: &str, limit: u64) -> AppResult<Vec<SentimentPoint>>;
}

pub struct SentimentStore {
    db: DatabaseConnection,
}

impl SentimentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SentimentRepository for SentimentStore {
    async fn insert(&self, point: NewSentimentPoint) -> AppResult<SentimentPoint> {
        let sentiment = point.sentiment;
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            company_name: Set(point.company_name),
            company_key: Set(point.company_key),
            score: Set(sentiment.overall_score),
            positive: Set(sentiment.positive),
            neutral: Set(sentiment.neutral),
            negative: Set(sentiment.negative),
            sample_size: Set(point.sample_size),
            themes: Set(to_json(&sentiment.key_themes)?),
            recorded_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        SentimentPoint::try_from(model)
    }

    async fn history(&self, company_key: &str, limit: u64) -> AppResult<Vec<SentimentPoint>> {
        let models = SentimentEntity::find()
            .filter(sentiment_data::Column::CompanyKey.eq(company_key))
            .order_by_desc(sentiment_data::Column::RecordedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        let mut points = models
            .into_iter()
            .map(SentimentPoint::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        points.reverse();
        Ok(points)
    }
}
