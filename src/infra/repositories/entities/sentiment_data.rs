//! Sentiment observation entity.

use sea_orm::entity::prelude::*;

use super::from_json;
use crate::domain::SentimentPoint;
use crate::errors::AppResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sentiment_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_name: String,
    pub company_key: String,
    pub score: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub sample_size: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub themes: Json,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SentimentPoint {
    type Error = crate::errors::AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(SentimentPoint {
            id: model.id,
            company_name: model.company_name,
            score: model.score,
            positive: model.positive,
            neutral: model.neutral,
            negative: model.negative,
            sample_size: model.sample_size,
            themes: from_json(model.themes, "sentiment_data.themes")?,
            recorded_at: model.recorded_at,
        })
    }
}
