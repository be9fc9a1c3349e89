//! Submission registry service.
//!
//! Submissions carry an append-only status history: every transition writes
//! exactly one history row in the same transaction, and the last entry always
//! matches the current status. The terminal lock freezes the status without
//! becoming part of the history.

use std::collections::HashMap;

use chrono::Utc;
use launchdesk_common::{AppError, AppResult, IdGenerator};
use launchdesk_db::{
    entities::{Role, SubmissionStatus, submission, submission_status_history, user},
    repositories::{SubmissionRepository, UserRepository},
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::capabilities::Capabilities;

/// Submission service for business logic.
#[derive(Clone)]
pub struct SubmissionService {
    submission_repo: SubmissionRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for the public intake form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionInput {
    #[validate(length(min = 1, max = 128))]
    pub project_name: String,

    #[validate(length(min = 1, max = 4000))]
    pub description: String,

    #[validate(email)]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub socials: SocialsInput,
}

/// Social handles on the intake form.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SocialsInput {
    #[validate(length(max = 256))]
    pub x: Option<String>,

    #[validate(length(max = 256))]
    pub telegram: Option<String>,

    #[validate(length(max = 256))]
    pub discord: Option<String>,

    #[validate(length(max = 256))]
    pub founder_tg: Option<String>,
}

/// Reviewer as embedded in submission responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl From<&user::Model> for UserRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Social handles as rendered on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Socials {
    pub x: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
    pub founder_tg: Option<String>,
}

/// Wire shape of a submission.
///
/// `approved_by`/`rejected_by` name the last users who set those statuses;
/// a reference to a since-deleted user hydrates to null.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: String,
    pub submission_code: String,
    pub project_name: String,
    pub description: String,
    pub email: Option<String>,
    pub socials: Socials,
    pub status: SubmissionStatus,
    pub status_locked: bool,
    pub approved_by: Option<UserRef>,
    pub rejected_by: Option<UserRef>,
    pub submitted_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// One audit-history entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub id: String,
    pub status: SubmissionStatus,
    /// Null for system entries (the initial pending row) and deleted users.
    pub changed_by: Option<UserRef>,
    pub changed_at: DateTimeWithTimeZone,
}

/// Single-fetch response: the submission plus its full history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetailView {
    #[serde(flatten)]
    pub submission: SubmissionView,
    pub status_history: Vec<HistoryEntryView>,
}

impl SubmissionView {
    fn assemble(model: submission::Model, refs: &HashMap<String, UserRef>) -> Self {
        let approved_by = model.approved_by.as_ref().and_then(|id| refs.get(id).cloned());
        let rejected_by = model.rejected_by.as_ref().and_then(|id| refs.get(id).cloned());
        Self {
            id: model.id,
            submission_code: model.submission_code,
            project_name: model.project_name,
            description: model.description,
            email: model.email,
            socials: Socials {
                x: model.social_x,
                telegram: model.social_telegram,
                discord: model.social_discord,
                founder_tg: model.founder_tg,
            },
            status: model.status,
            status_locked: model.status_locked,
            approved_by,
            rejected_by,
            submitted_at: model.submitted_at,
            updated_at: model.updated_at,
        }
    }
}

impl SubmissionService {
    /// Create a new submission service.
    #[must_use]
    pub fn new(submission_repo: SubmissionRepository, user_repo: UserRepository) -> Self {
        Self {
            submission_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Accept a public intake submission.
    ///
    /// The row and the initial `{pending, system}` history entry are written
    /// in one transaction. Returns the stored model; the endpoint surfaces
    /// only the generated submission code.
    pub async fn create(&self, input: CreateSubmissionInput) -> AppResult<submission::Model> {
        input.validate()?;

        let email = input.email.filter(|v| !v.trim().is_empty());
        let founder_tg = input.socials.founder_tg.filter(|v| !v.trim().is_empty());
        if email.is_none() && founder_tg.is_none() {
            return Err(AppError::Validation(
                "Provide an email or a founder Telegram handle".to_string(),
            ));
        }

        let now = Utc::now();
        let id = self.id_gen.generate();

        let submission = submission::ActiveModel {
            id: Set(id.clone()),
            submission_code: Set(self.id_gen.generate_submission_code()),
            project_name: Set(input.project_name),
            description: Set(input.description),
            email: Set(email),
            social_x: Set(input.socials.x.filter(|v| !v.trim().is_empty())),
            social_telegram: Set(input.socials.telegram.filter(|v| !v.trim().is_empty())),
            social_discord: Set(input.socials.discord.filter(|v| !v.trim().is_empty())),
            founder_tg: Set(founder_tg),
            status: Set(SubmissionStatus::Pending),
            status_locked: Set(false),
            approved_by: Set(None),
            rejected_by: Set(None),
            submitted_at: Set(now.into()),
            updated_at: Set(None),
        };
        let history = submission_status_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            submission_id: Set(id),
            status: Set(SubmissionStatus::Pending),
            changed_by: Set(None),
            changed_at: Set(now.into()),
        };

        self.submission_repo.create_with_history(submission, history).await
    }

    /// All submissions, newest first, reviewers hydrated.
    pub async fn list(&self) -> AppResult<Vec<SubmissionView>> {
        let models = self.submission_repo.find_all().await?;
        self.assemble_many(models).await
    }

    /// Case-insensitive substring search over code, project name, email, and
    /// founder Telegram handle.
    pub async fn search(&self, query: &str) -> AppResult<Vec<SubmissionView>> {
        let models = self.submission_repo.search(query).await?;
        self.assemble_many(models).await
    }

    /// One submission with its full, hydrated status history.
    pub async fn get(&self, id: &str) -> AppResult<SubmissionDetailView> {
        let model = self.submission_repo.get_by_id(id).await?;
        let history = self.submission_repo.find_history(&model.id).await?;

        let refs = self
            .user_refs(
                model
                    .approved_by
                    .iter()
                    .chain(model.rejected_by.iter())
                    .chain(history.iter().filter_map(|h| h.changed_by.as_ref()))
                    .cloned(),
            )
            .await?;

        let status_history = history
            .into_iter()
            .map(|h| HistoryEntryView {
                id: h.id,
                status: h.status,
                changed_by: h.changed_by.as_ref().and_then(|id| refs.get(id).cloned()),
                changed_at: h.changed_at,
            })
            .collect();

        Ok(SubmissionDetailView {
            submission: SubmissionView::assemble(model, &refs),
            status_history,
        })
    }

    /// Apply a status transition.
    ///
    /// Any→any transitions are allowed, including reverts to pending and
    /// self-transitions. `approved_by`/`rejected_by` are last-write-wins and
    /// never cleared. Conflict when the status is locked.
    pub async fn set_status(
        &self,
        id: &str,
        new_status: SubmissionStatus,
        acting_user: &user::Model,
    ) -> AppResult<SubmissionView> {
        if !Capabilities::for_role(acting_user.role).can_review_submissions {
            return Err(AppError::Forbidden(
                "You are not allowed to review submissions".to_string(),
            ));
        }

        let model = self.submission_repo.get_by_id(id).await?;
        if model.status_locked {
            return Err(AppError::Conflict(
                "Submission status is locked".to_string(),
            ));
        }

        let now = Utc::now();
        let submission_id = model.id.clone();
        let mut active: submission::ActiveModel = model.into();
        active.status = Set(new_status);
        match new_status {
            SubmissionStatus::Approved => active.approved_by = Set(Some(acting_user.id.clone())),
            SubmissionStatus::Rejected => active.rejected_by = Set(Some(acting_user.id.clone())),
            SubmissionStatus::Pending => {}
        }
        active.updated_at = Set(Some(now.into()));

        let history = submission_status_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            submission_id: Set(submission_id),
            status: Set(new_status),
            changed_by: Set(Some(acting_user.id.clone())),
            changed_at: Set(now.into()),
        };

        let updated = self.submission_repo.update_with_history(active, history).await?;
        self.assemble_one(updated).await
    }

    /// Apply the irreversible terminal lock. No history entry: the lock
    /// freezes the status, it is not a status.
    pub async fn lock(&self, id: &str, acting_user: &user::Model) -> AppResult<SubmissionView> {
        if !Capabilities::for_role(acting_user.role).can_lock_submissions {
            return Err(AppError::Forbidden(
                "You are not allowed to lock submissions".to_string(),
            ));
        }

        let model = self.submission_repo.get_by_id(id).await?;
        if model.status_locked {
            return Err(AppError::Conflict(
                "Submission is already locked".to_string(),
            ));
        }

        let mut active: submission::ActiveModel = model.into();
        active.status_locked = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.submission_repo.update(active).await?;
        self.assemble_one(updated).await
    }

    /// Hard-delete a submission; history rows cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let deleted = self.submission_repo.delete_by_id(id).await?;
        if deleted == 0 {
            return Err(AppError::SubmissionNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn assemble_one(&self, model: submission::Model) -> AppResult<SubmissionView> {
        let refs = self
            .user_refs(
                model
                    .approved_by
                    .iter()
                    .chain(model.rejected_by.iter())
                    .cloned(),
            )
            .await?;
        Ok(SubmissionView::assemble(model, &refs))
    }

    async fn assemble_many(
        &self,
        models: Vec<submission::Model>,
    ) -> AppResult<Vec<SubmissionView>> {
        let refs = self
            .user_refs(
                models
                    .iter()
                    .flat_map(|m| m.approved_by.clone().into_iter().chain(m.rejected_by.clone())),
            )
            .await?;
        Ok(models
            .into_iter()
            .map(|m| SubmissionView::assemble(m, &refs))
            .collect())
    }

    async fn user_refs(
        &self,
        ids: impl Iterator<Item = String>,
    ) -> AppResult<HashMap<String, UserRef>> {
        let mut ids: Vec<String> = ids.collect();
        ids.sort_unstable();
        ids.dedup();
        let users = self.user_repo.find_by_ids(&ids).await?;
        Ok(users.iter().map(|u| (u.id.clone(), UserRef::from(u))).collect())
    }
}
