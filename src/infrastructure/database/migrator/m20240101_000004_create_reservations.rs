//! Create reservations table
//!
//! The (business, resource, start, end) index serves the overlap query run
//! on every booking.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_businesses::Businesses;
use super::m20240101_000003_create_resources::Resources;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::BusinessId).string().not_null())
                    .col(ColumnDef::new(Reservations::ResourceId).string().null())
                    .col(ColumnDef::new(Reservations::ClientId).string().null())
                    .col(
                        ColumnDef::new(Reservations::ContactName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::ContactEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::ContactPhone)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::ContactDni).string_len(50).null())
                    .col(
                        ColumnDef::new(Reservations::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::NumberOfGuests)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::Notes).text().null())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string_len(20)
                            .not_null()
                            .default("Confirmed"),
                    )
                    .col(
                        ColumnDef::new(Reservations::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_business")
                            .from(Reservations::Table, Reservations::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_resource")
                            .from(Reservations::Table, Reservations::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_slot")
                    .table(Reservations::Table)
                    .col(Reservations::BusinessId)
                    .col(Reservations::ResourceId)
                    .col(Reservations::StartAt)
                    .col(Reservations::EndAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_status")
                    .table(Reservations::Table)
                    .col(Reservations::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    BusinessId,
    ResourceId,
    ClientId,
    ContactName,
    ContactEmail,
    ContactPhone,
    ContactDni,
    StartAt,
    EndAt,
    NumberOfGuests,
    Notes,
    Status,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
