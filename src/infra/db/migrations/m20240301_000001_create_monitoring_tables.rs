//! Migration: Create monitored_companies and sentiment_data tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MonitoredCompanies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonitoredCompanies::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonitoredCompanies::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(MonitoredCompanies::CompanyKey)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MonitoredCompanies::AddedBy).uuid().null())
                    .col(
                        ColumnDef::new(MonitoredCompanies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MonitoredCompanies::LastCheckedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SentimentData::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SentimentData::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SentimentData::CompanyName).string_len(255).not_null())
                    .col(ColumnDef::new(SentimentData::CompanyKey).string_len(255).not_null())
                    .col(ColumnDef::new(SentimentData::Score).double().not_null())
                    .col(ColumnDef::new(SentimentData::Positive).double().not_null())
                    .col(ColumnDef::new(SentimentData::Neutral).double().not_null())
                    .col(ColumnDef::new(SentimentData::Negative).double().not_null())
                    .col(ColumnDef::new(SentimentData::SampleSize).integer().not_null())
                    .col(ColumnDef::new(SentimentData::Themes).json_binary().not_null())
                    .col(
                        ColumnDef::new(SentimentData::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sentiment_data_company_recorded")
                    .table(SentimentData::Table)
                    .col(SentimentData::CompanyKey)
                    .col(SentimentData::RecordedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SentimentData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonitoredCompanies::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MonitoredCompanies {
    Table,
    Id,
    Name,
    CompanyKey,
    AddedBy,
    CreatedAt,
    LastCheckedAt,
}

#[derive(Iden)]
enum SentimentData {
    Table,
    Id,
    CompanyName,
    CompanyKey,
    Score,
    Positive,
    Neutral,
    Negative,
    SampleSize,
    Themes,
    RecordedAt,
}
