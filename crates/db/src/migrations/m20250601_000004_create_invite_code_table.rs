//! Create invite code table migration.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InviteCode::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InviteCode::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InviteCode::Code).string_len(64).not_null())
                    .col(ColumnDef::new(InviteCode::Email).string_len(256).not_null())
                    .col(ColumnDef::new(InviteCode::Role).string_len(16).not_null())
                    .col(ColumnDef::new(InviteCode::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(InviteCode::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InviteCode::CreatedBy).string_len(32))
                    .col(
                        ColumnDef::new(InviteCode::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(InviteCode::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invite_code_created_by")
                            .from(InviteCode::Table, InviteCode::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: code (lookup at registration)
        manager
            .create_index(
                Index::create()
                    .name("idx_invite_code_code")
                    .table(InviteCode::Table)
                    .col(InviteCode::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status + expires_at (expiry sweep)
        manager
            .create_index(
                Index::create()
                    .name("idx_invite_code_status_expires_at")
                    .table(InviteCode::Table)
                    .col(InviteCode::Status)
                    .col(InviteCode::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InviteCode::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InviteCode {
    Table,
    Id,
    Code,
    Email,
    Role,
    Status,
    ExpiresAt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
