//! Invite code repository.

use std::sync::Arc;

use crate::entities::{InviteCode, invite_code, user};
use launchdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};

use crate::entities::invite_code::InviteStatus;

/// Invite code repository for database operations.
#[derive(Clone)]
pub struct InviteCodeRepository {
    db: Arc<DatabaseConnection>,
}

impl InviteCodeRepository {
    /// Create a new invite code repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an invite by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<invite_code::Model>> {
        InviteCode::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an invite by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<invite_code::Model> {
        self.find_by_id(id).await?.ok_or(AppError::InviteNotFound)
    }

    /// Find an invite by its code token.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<invite_code::Model>> {
        InviteCode::find()
            .filter(invite_code::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All invites, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<invite_code::Model>> {
        InviteCode::find()
            .order_by_desc(invite_code::Column::CreatedAt)
            .order_by_desc(invite_code::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an invite and bump the issuer's counter in one transaction.
    pub async fn create_with_issuer(
        &self,
        invite: invite_code::ActiveModel,
        issuer_id: &str,
    ) -> AppResult<invite_code::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = invite
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        user::Entity::update_many()
            .col_expr(
                user::Column::CodesGenerated,
                Expr::col(user::Column::CodesGenerated).add(1),
            )
            .filter(user::Column::Id.eq(issuer_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Update an invite (resend, revoke, expire).
    pub async fn update(&self, model: invite_code::ActiveModel) -> AppResult<invite_code::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark the invite consumed and create the registrant's user row in one
    /// transaction: either both happen or neither does.
    pub async fn consume_with_user(
        &self,
        invite: invite_code::ActiveModel,
        new_user: user::ActiveModel,
    ) -> AppResult<user::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = new_user
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        invite
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Flip overdue `sent` codes to `expired` (background sweep).
    /// Returns the number of affected rows.
    pub async fn expire_overdue(
        &self,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<u64> {
        let res = InviteCode::update_many()
            .col_expr(invite_code::Column::Status, Expr::value(InviteStatus::Expired))
            .col_expr(invite_code::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(invite_code::Column::Status.eq(InviteStatus::Sent))
            .filter(invite_code::Column::ExpiresAt.lt(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }

    /// Convenience for lazy consume-time expiry: persist `expired` status.
    pub async fn mark_expired(&self, model: invite_code::Model) -> AppResult<invite_code::Model> {
        let now = chrono::Utc::now();
        let mut active: invite_code::ActiveModel = model.into();
        active.status = Set(InviteStatus::Expired);
        active.updated_at = Set(Some(now.into()));
        self.update(active).await
    }
}
