//! Submission entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a submission.
///
/// Transitions are deliberately unrestricted (any state may move to any
/// other, including back to pending) unless `status_locked` is set.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Human-shareable code, generated at creation, immutable
    #[sea_orm(unique)]
    pub submission_code: String,

    pub project_name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Contact email; either this or `founder_tg` must be present
    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// X (Twitter) handle or URL
    #[sea_orm(nullable)]
    pub social_x: Option<String>,

    /// Telegram community handle or URL
    #[sea_orm(nullable)]
    pub social_telegram: Option<String>,

    /// Discord invite or handle
    #[sea_orm(nullable)]
    pub social_discord: Option<String>,

    /// Founder's Telegram handle; fallback contact channel
    #[sea_orm(nullable)]
    pub founder_tg: Option<String>,

    pub status: SubmissionStatus,

    /// Terminal lock; once true the status is frozen permanently
    #[sea_orm(default_value = false)]
    pub status_locked: bool,

    /// Last user who set approved; last-write-wins, never cleared
    #[sea_orm(nullable)]
    pub approved_by: Option<String>,

    /// Last user who set rejected; last-write-wins, never cleared
    #[sea_orm(nullable)]
    pub rejected_by: Option<String>,

    pub submitted_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submission_status_history::Entity")]
    StatusHistory,
}

impl Related<super::submission_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
