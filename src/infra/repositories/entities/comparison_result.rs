//! Stored comparison entity.

use sea_orm::entity::prelude::*;

use super::from_json;
use crate::domain::ComparisonResult;
use crate::errors::AppResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comparison_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub companies: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub metrics: Json,
    #[sea_orm(column_type = "Text")]
    pub insights: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub charts: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ComparisonResult {
    type Error = crate::errors::AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(ComparisonResult {
            id: model.id,
            user_id: model.user_id,
            companies: from_json(model.companies, "comparison_results.companies")?,
            metrics: from_json(model.metrics, "comparison_results.metrics")?,
            insights: model.insights,
            charts: from_json(model.charts, "comparison_results.charts")?,
            created_at: model.created_at,
        })
    }
}
