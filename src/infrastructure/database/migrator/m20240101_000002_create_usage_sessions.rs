//! Create usage_sessions table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_dispensers::Dispensers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UsageSessions::DispenserId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UsageSessions::OpenedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UsageSessions::ClosedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UsageSessions::TotalSpent).string())
                    .col(
                        ColumnDef::new(UsageSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usage_sessions_dispenser")
                            .from(UsageSessions::Table, UsageSessions::DispenserId)
                            .to(Dispensers::Table, Dispensers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_usage_sessions_dispenser")
                    .table(UsageSessions::Table)
                    .col(UsageSessions::DispenserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UsageSessions {
    Table,
    Id,
    DispenserId,
    OpenedAt,
    ClosedAt,
    TotalSpent,
    CreatedAt,
}
