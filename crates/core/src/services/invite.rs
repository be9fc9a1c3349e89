//! Invite-gated registration service.
//!
//! Invites are single-use, expiring, revocable codes bound to an email and a
//! role. Lifecycle: `sent` is the only live state; `consumed`, `revoked`, and
//! `expired` are terminal.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use launchdesk_common::{AppError, AppResult, Config, IdGenerator};
use launchdesk_db::{
    entities::{InviteStatus, Role, invite_code, user},
    repositories::{InviteCodeRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::auth::hash_password;
use crate::services::capabilities::Capabilities;
use crate::services::mailer::MailerService;

/// Invite code service for business logic.
#[derive(Clone)]
pub struct InviteService {
    invite_repo: InviteCodeRepository,
    user_repo: UserRepository,
    mailer: MailerService,
    id_gen: IdGenerator,
    ttl_hours: i64,
}

/// Input for generating an invite.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateInviteInput {
    #[validate(email)]
    pub email: String,

    /// `Option` so a missing role maps to a validation error rather than a
    /// body-deserialization rejection.
    pub role: Option<Role>,
}

/// Issuing user as embedded in invite responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&user::Model> for IssuerRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Wire shape of an invite code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteView {
    pub id: String,
    pub code: String,
    pub email: String,
    pub role: Role,
    pub status: InviteStatus,
    pub expires_at: sea_orm::prelude::DateTimeWithTimeZone,
    /// Null when issued by the system or when the issuer was deleted.
    pub created_by: Option<IssuerRef>,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
}

impl InviteView {
    fn assemble(model: invite_code::Model, issuers: &HashMap<String, IssuerRef>) -> Self {
        let created_by = model
            .created_by
            .as_ref()
            .and_then(|id| issuers.get(id).cloned());
        Self {
            id: model.id,
            code: model.code,
            email: model.email,
            role: model.role,
            status: model.status,
            expires_at: model.expires_at,
            created_by,
            created_at: model.created_at,
        }
    }
}

impl InviteService {
    /// Create a new invite service.
    #[must_use]
    pub fn new(
        invite_repo: InviteCodeRepository,
        user_repo: UserRepository,
        mailer: MailerService,
        config: &Config,
    ) -> Self {
        Self {
            invite_repo,
            user_repo,
            mailer,
            id_gen: IdGenerator::new(),
            ttl_hours: config.invites.ttl_hours,
        }
    }

    /// All invites, newest first, issuers hydrated.
    pub async fn list(&self) -> AppResult<Vec<InviteView>> {
        let invites = self.invite_repo.find_all().await?;
        let issuers = self
            .issuer_refs(invites.iter().filter_map(|i| i.created_by.clone()))
            .await?;
        Ok(invites
            .into_iter()
            .map(|i| InviteView::assemble(i, &issuers))
            .collect())
    }

    /// Generate an invite for an email/role pair and email it out.
    ///
    /// The row and the issuer's counter bump land in one transaction; the
    /// email send is best-effort afterwards.
    pub async fn generate(
        &self,
        input: GenerateInviteInput,
        acting_user: &user::Model,
    ) -> AppResult<InviteView> {
        if !Capabilities::for_role(acting_user.role).can_issue_invites {
            return Err(AppError::Forbidden(
                "You are not allowed to issue invites".to_string(),
            ));
        }

        input.validate()?;
        let role = input
            .role
            .ok_or_else(|| AppError::Validation("Role is required".to_string()))?;
        if role == Role::SuperAdmin {
            return Err(AppError::Validation(
                "The superAdmin role cannot be granted by invite".to_string(),
            ));
        }

        let now = Utc::now();
        let model = invite_code::ActiveModel {
            id: Set(self.id_gen.generate()),
            code: Set(self.id_gen.generate_token()),
            email: Set(input.email.to_lowercase()),
            role: Set(role),
            status: Set(InviteStatus::Sent),
            expires_at: Set((now + Duration::hours(self.ttl_hours)).into()),
            created_by: Set(Some(acting_user.id.clone())),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let invite = self
            .invite_repo
            .create_with_issuer(model, &acting_user.id)
            .await?;

        self.send_best_effort(&invite).await;

        let mut issuers = HashMap::new();
        issuers.insert(acting_user.id.clone(), IssuerRef::from(acting_user));
        Ok(InviteView::assemble(invite, &issuers))
    }

    /// Regenerate the code and expiry of a still-pending invite and re-send it.
    /// Identity, email, role, and issuer are unchanged.
    pub async fn resend(&self, id: &str, acting_user: &user::Model) -> AppResult<InviteView> {
        if !Capabilities::for_role(acting_user.role).can_issue_invites {
            return Err(AppError::Forbidden(
                "You are not allowed to issue invites".to_string(),
            ));
        }

        let invite = self.invite_repo.get_by_id(id).await?;
        if invite.status != InviteStatus::Sent {
            return Err(AppError::Conflict(
                "Only pending invites can be resent".to_string(),
            ));
        }

        let now = Utc::now();
        let mut active: invite_code::ActiveModel = invite.into();
        active.code = Set(self.id_gen.generate_token());
        active.expires_at = Set((now + Duration::hours(self.ttl_hours)).into());
        active.updated_at = Set(Some(now.into()));

        let invite = self.invite_repo.update(active).await?;
        self.send_best_effort(&invite).await;

        let issuers = self
            .issuer_refs(invite.created_by.clone().into_iter())
            .await?;
        Ok(InviteView::assemble(invite, &issuers))
    }

    /// Revoke a still-pending invite. Irreversible.
    pub async fn revoke(&self, id: &str, acting_user: &user::Model) -> AppResult<()> {
        if !Capabilities::for_role(acting_user.role).can_issue_invites {
            return Err(AppError::Forbidden(
                "You are not allowed to issue invites".to_string(),
            ));
        }

        let invite = self.invite_repo.get_by_id(id).await?;
        if invite.status != InviteStatus::Sent {
            return Err(AppError::Conflict(
                "Only pending invites can be revoked".to_string(),
            ));
        }

        let mut active: invite_code::ActiveModel = invite.into();
        active.status = Set(InviteStatus::Revoked);
        active.updated_at = Set(Some(Utc::now().into()));
        self.invite_repo.update(active).await?;

        Ok(())
    }

    /// Consume an invite and create the registrant's account, atomically.
    ///
    /// Expiry is evaluated against the clock, not only the stored status; an
    /// overdue row still reading `sent` is flipped to `expired` on the way out.
    pub async fn consume(
        &self,
        code: &str,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<user::Model> {
        let invite = self
            .invite_repo
            .find_by_code(code)
            .await?
            .ok_or(AppError::InviteNotFound)?;

        match invite.status {
            InviteStatus::Sent => {}
            InviteStatus::Consumed => {
                return Err(AppError::Conflict(
                    "This invite has already been used".to_string(),
                ));
            }
            InviteStatus::Revoked => {
                return Err(AppError::Conflict("This invite was revoked".to_string()));
            }
            InviteStatus::Expired => {
                return Err(AppError::Conflict("This invite has expired".to_string()));
            }
        }

        let now = Utc::now();
        if invite.expires_at < now {
            self.invite_repo.mark_expired(invite).await?;
            return Err(AppError::Conflict("This invite has expired".to_string()));
        }

        let email = email.to_lowercase();
        if email != invite.email {
            return Err(AppError::Validation(
                "Email does not match the invite".to_string(),
            ));
        }

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let role = invite.role;

        let mut consumed: invite_code::ActiveModel = invite.into();
        consumed.status = Set(InviteStatus::Consumed);
        consumed.updated_at = Set(Some(now.into()));

        let new_user = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role),
            is_protected: Set(false),
            codes_generated: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        self.invite_repo.consume_with_user(consumed, new_user).await
    }

    /// Flip overdue `sent` codes to `expired`. Returns the number flipped.
    pub async fn expire_overdue(&self) -> AppResult<u64> {
        self.invite_repo.expire_overdue(Utc::now().into()).await
    }

    async fn send_best_effort(&self, invite: &invite_code::Model) {
        if let Err(e) = self
            .mailer
            .send_invite(&invite.email, &invite.code, invite.role, invite.expires_at)
            .await
        {
            tracing::warn!(
                invite_id = %invite.id,
                error = %e,
                "Failed to send invite email; the code is persisted"
            );
        }
    }

    async fn issuer_refs(
        &self,
        ids: impl Iterator<Item = String>,
    ) -> AppResult<HashMap<String, IssuerRef>> {
        let mut ids: Vec<String> = ids.collect();
        ids.sort_unstable();
        ids.dedup();
        let users = self.user_repo.find_by_ids(&ids).await?;
        Ok(users
            .iter()
            .map(|u| (u.id.clone(), IssuerRef::from(u)))
            .collect())
    }
}
