//! Stored analysis entity. Report and charts live in jsonb columns.

use sea_orm::entity::prelude::*;

use super::from_json;
use crate::domain::{AnalysisSource, UserAnalysis};
use crate::errors::AppResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_analyses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub company_key: String,
    pub source: String,
    pub document_name: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub report: Json,
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

impl TryFrom<Model> for UserAnalysis {
    type Error = crate::errors::AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(UserAnalysis {
            id: model.id,
            user_id: model.user_id,
            company_name: model.company_name,
            source: AnalysisSource::from(model.source.as_str()),
            document_name: model.document_name,
            report: from_json(model.report, "user_analyses.report")?,
            charts: from_json(model.charts, "user_analyses.charts")?,
            created_at: model.created_at,
        })
    }
}
