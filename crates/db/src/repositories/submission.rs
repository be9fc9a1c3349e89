//! Submission repository.

use std::sync::Arc;

use crate::entities::{Submission, SubmissionStatusHistory, submission, submission_status_history};
use launchdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};

/// Escape LIKE wildcards in a user-supplied search query.
fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Submission repository for database operations.
#[derive(Clone)]
pub struct SubmissionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubmissionRepository {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a submission by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<submission::Model>> {
        Submission::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a submission by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<submission::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SubmissionNotFound(id.to_string()))
    }

    /// All submissions, newest first. The secondary ID sort keeps the order
    /// deterministic for rows sharing a timestamp.
    pub async fn find_all(&self) -> AppResult<Vec<submission::Model>> {
        Submission::find()
            .order_by_desc(submission::Column::SubmittedAt)
            .order_by_desc(submission::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Case-insensitive substring search over code, project name, and the
    /// contact fields. Same order as [`Self::find_all`].
    pub async fn search(&self, query: &str) -> AppResult<Vec<submission::Model>> {
        let pattern = format!("%{}%", escape_like(query));

        Submission::find()
            .filter(
                Condition::any()
                    .add(Expr::col(submission::Column::SubmissionCode).ilike(pattern.as_str()))
                    .add(Expr::col(submission::Column::ProjectName).ilike(pattern.as_str()))
                    .add(Expr::col(submission::Column::Email).ilike(pattern.as_str()))
                    .add(Expr::col(submission::Column::FounderTg).ilike(pattern.as_str())),
            )
            .order_by_desc(submission::Column::SubmittedAt)
            .order_by_desc(submission::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a submission together with its initial history entry.
    /// Both rows land in one transaction: either both exist or neither does.
    pub async fn create_with_history(
        &self,
        submission: submission::ActiveModel,
        history: submission_status_history::ActiveModel,
    ) -> AppResult<submission::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = submission
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        history
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Apply a status transition and append its audit entry atomically.
    pub async fn update_with_history(
        &self,
        submission: submission::ActiveModel,
        history: submission_status_history::ActiveModel,
    ) -> AppResult<submission::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = submission
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        history
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Update a submission without touching history (the terminal lock).
    pub async fn update(&self, model: submission::ActiveModel) -> AppResult<submission::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a submission by ID. History rows cascade.
    /// Returns the number of deleted rows.
    pub async fn delete_by_id(&self, id: &str) -> AppResult<u64> {
        let res = Submission::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }

    /// Status history for a submission, oldest first.
    pub async fn find_history(
        &self,
        submission_id: &str,
    ) -> AppResult<Vec<submission_status_history::Model>> {
        SubmissionStatusHistory::find()
            .filter(submission_status_history::Column::SubmissionId.eq(submission_id))
            .order_by_asc(submission_status_history::Column::ChangedAt)
            .order_by_asc(submission_status_history::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
