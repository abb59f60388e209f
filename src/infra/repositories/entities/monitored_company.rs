//! Monitored company entity.

use sea_orm::entity::prelude::*;

use crate::domain::MonitoredCompany;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "monitored_companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub company_key: String,
    pub added_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub last_checked_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MonitoredCompany {
    fn from(model: Model) -> Self {
        MonitoredCompany {
            id: model.id,
            name: model.name,
            added_by: model.added_by,
            created_at: model.created_at,
            last_checked_at: model.last_checked_at,
        }
    }
}
