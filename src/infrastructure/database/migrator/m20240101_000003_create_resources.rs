//! Create resources table
//!
//! Tables and rooms share one table, told apart by `kind`.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_businesses::Businesses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resources::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resources::BusinessId).string().not_null())
                    .col(ColumnDef::new(Resources::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(Resources::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Resources::MinCapacity).integer().null())
                    .col(ColumnDef::new(Resources::MaxCapacity).integer().null())
                    .col(
                        ColumnDef::new(Resources::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Resources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Resources::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Resources::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resources_business")
                            .from(Resources::Table, Resources::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resources_business")
                    .table(Resources::Table)
                    .col(Resources::BusinessId)
                    .col(Resources::Kind)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Resources {
    Table,
    Id,
    BusinessId,
    Kind,
    Name,
    MinCapacity,
    MaxCapacity,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
