//! Invite code entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::Role;

/// Lifecycle of an invite code: sent -> {consumed | revoked | expired}.
/// The three terminal states are immutable.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    #[sea_orm(string_value = "sent")]
    Sent,

    #[sea_orm(string_value = "consumed")]
    Consumed,

    #[sea_orm(string_value = "revoked")]
    Revoked,

    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invite_code")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Single-use token; regenerated on resend
    #[sea_orm(unique)]
    pub code: String,

    /// Target invitee, stored lowercased
    pub email: String,

    /// Role granted on consumption; admin or moderator only
    pub role: Role,

    pub status: InviteStatus,

    /// Consume-time expiry is checked against the clock, not only this
    /// row's stored status
    pub expires_at: DateTimeWithTimeZone,

    /// Issuing user; NULL after the issuer is deleted
    #[sea_orm(nullable)]
    pub created_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Issuer,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issuer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
