//! Migration: Create user_analyses and comparison_results tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAnalyses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserAnalyses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UserAnalyses::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserAnalyses::CompanyName).string_len(255).not_null())
                    .col(ColumnDef::new(UserAnalyses::CompanyKey).string_len(255).not_null())
                    .col(ColumnDef::new(UserAnalyses::Source).string_len(16).not_null())
                    .col(ColumnDef::new(UserAnalyses::DocumentName).string_len(255).null())
                    .col(ColumnDef::new(UserAnalyses::Report).json_binary().not_null())
                    .col(ColumnDef::new(UserAnalyses::Charts).json_binary().not_null())
                    .col(
                        ColumnDef::new(UserAnalyses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_analyses_user")
                            .from(UserAnalyses::Table, UserAnalyses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing by owner and "latest analysis of this company" both
        // filter on user_id first.
        manager
            .create_index(
                Index::create()
                    .name("idx_user_analyses_user_company")
                    .table(UserAnalyses::Table)
                    .col(UserAnalyses::UserId)
                    .col(UserAnalyses::CompanyKey)
                    .col(UserAnalyses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ComparisonResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComparisonResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ComparisonResults::UserId).uuid().not_null())
                    .col(ColumnDef::new(ComparisonResults::Companies).json_binary().not_null())
                    .col(ColumnDef::new(ComparisonResults::Metrics).json_binary().not_null())
                    .col(ColumnDef::new(ComparisonResults::Insights).text().not_null())
                    .col(ColumnDef::new(ComparisonResults::Charts).json_binary().not_null())
                    .col(
                        ColumnDef::new(ComparisonResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comparison_results_user")
                            .from(ComparisonResults::Table, ComparisonResults::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comparison_results_user")
                    .table(ComparisonResults::Table)
                    .col(ComparisonResults::UserId)
                    .col(ComparisonResults::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComparisonResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAnalyses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserAnalyses {
    Table,
    Id,
    UserId,
    CompanyName,
    CompanyKey,
    Source,
    DocumentName,
    Report,
    Charts,
    CreatedAt,
}

#[derive(Iden)]
enum ComparisonResults {
    Table,
    Id,
    UserId,
    Companies,
    Metrics,
    Insights,
    Charts,
    CreatedAt,
}
