//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff role. `superAdmin` is never issuable via invite.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    #[sea_orm(string_value = "superAdmin")]
    #[serde(rename = "superAdmin")]
    SuperAdmin,

    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    Admin,

    #[sea_orm(string_value = "moderator")]
    #[serde(rename = "moderator")]
    Moderator,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Login email, stored lowercased
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash
    pub password_hash: String,

    pub role: Role,

    /// Founding accounts; exempt from deletion and role changes
    #[sea_orm(default_value = false)]
    pub is_protected: bool,

    /// Invite codes issued by this user (denormalized)
    #[sea_orm(default_value = 0)]
    pub codes_generated: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,

    #[sea_orm(has_many = "super::invite_code::Entity")]
    IssuedInvites,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::invite_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IssuedInvites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
