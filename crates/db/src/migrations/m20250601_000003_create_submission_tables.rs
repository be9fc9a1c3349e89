//! Create submission and status history tables migration.

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
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submission::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Submission::SubmissionCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submission::ProjectName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submission::Description).text().not_null())
                    .col(ColumnDef::new(Submission::Email).string_len(256))
                    .col(ColumnDef::new(Submission::SocialX).string_len(256))
                    .col(ColumnDef::new(Submission::SocialTelegram).string_len(256))
                    .col(ColumnDef::new(Submission::SocialDiscord).string_len(256))
                    .col(ColumnDef::new(Submission::FounderTg).string_len(256))
                    .col(ColumnDef::new(Submission::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Submission::StatusLocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Submission::ApprovedBy).string_len(32))
                    .col(ColumnDef::new(Submission::RejectedBy).string_len(32))
                    .col(
                        ColumnDef::new(Submission::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Submission::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_approved_by")
                            .from(Submission::Table, Submission::ApprovedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_rejected_by")
                            .from(Submission::Table, Submission::RejectedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: submission_code
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_code")
                    .table(Submission::Table)
                    .col(Submission::SubmissionCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: submitted_at (default list order)
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_submitted_at")
                    .table(Submission::Table)
                    .col(Submission::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubmissionStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubmissionStatusHistory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubmissionStatusHistory::SubmissionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionStatusHistory::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubmissionStatusHistory::ChangedBy).string_len(32))
                    .col(
                        ColumnDef::new(SubmissionStatusHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_history_submission")
                            .from(
                                SubmissionStatusHistory::Table,
                                SubmissionStatusHistory::SubmissionId,
                            )
                            .to(Submission::Table, Submission::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_history_changed_by")
                            .from(
                                SubmissionStatusHistory::Table,
                                SubmissionStatusHistory::ChangedBy,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: submission_id + changed_at (history is read in order)
        manager
            .create_index(
                Index::create()
                    .name("idx_status_history_submission_changed_at")
                    .table(SubmissionStatusHistory::Table)
                    .col(SubmissionStatusHistory::SubmissionId)
                    .col(SubmissionStatusHistory::ChangedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubmissionStatusHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Submission {
    Table,
    Id,
    SubmissionCode,
    ProjectName,
    Description,
    Email,
    SocialX,
    SocialTelegram,
    SocialDiscord,
    FounderTg,
    Status,
    StatusLocked,
    ApprovedBy,
    RejectedBy,
    SubmittedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SubmissionStatusHistory {
    Table,
    Id,
    SubmissionId,
    Status,
    ChangedBy,
    ChangedAt,
}
