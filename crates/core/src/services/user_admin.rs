//! User administration service.

use chrono::Utc;
use launchdesk_common::{AppError, AppResult, IdGenerator, config::BootstrapConfig};
use launchdesk_db::{
    entities::{Role, user},
    repositories::UserRepository,
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::Serialize;

use crate::services::auth::hash_password;
use crate::services::capabilities::Capabilities;

/// User administration service: listing, role changes, deletion, and the
/// startup bootstrap seed.
#[derive(Clone)]
pub struct UserAdminService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Wire shape of a staff account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_protected: bool,
    pub codes_generated: i32,
    pub capabilities: Capabilities,
    pub created_at: DateTimeWithTimeZone,
}

impl From<user::Model> for UserView {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_protected: user.is_protected,
            codes_generated: user.codes_generated,
            capabilities: Capabilities::for_role(user.role),
            created_at: user.created_at,
        }
    }
}

impl UserAdminService {
    /// Create a new user administration service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All staff accounts, oldest first.
    pub async fn list(&self) -> AppResult<Vec<UserView>> {
        let users = self.user_repo.find_all().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Change a user's role. Promoting to superAdmin is allowed; protected
    /// accounts and the acting user's own account are not touchable.
    pub async fn set_role(
        &self,
        id: &str,
        new_role: Role,
        acting_user: &user::Model,
    ) -> AppResult<UserView> {
        self.guard_admin_action(id, acting_user)?;

        let target = self.user_repo.get_by_id(id).await?;
        if target.is_protected {
            return Err(AppError::Forbidden(
                "This account is protected".to_string(),
            ));
        }

        let mut active: user::ActiveModel = target.into();
        active.role = Set(new_role);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.user_repo.update(active).await?;
        Ok(UserView::from(updated))
    }

    /// Delete a user. Sessions cascade; invite and audit references go NULL,
    /// so attribution on surviving rows hydrates to null.
    pub async fn delete(&self, id: &str, acting_user: &user::Model) -> AppResult<()> {
        self.guard_admin_action(id, acting_user)?;

        let target = self.user_repo.get_by_id(id).await?;
        if target.is_protected {
            return Err(AppError::Forbidden(
                "This account is protected".to_string(),
            ));
        }

        self.user_repo.delete_by_id(&target.id).await?;
        Ok(())
    }

    /// Seed the founding superAdmin when configured and absent. This is the
    /// only path that creates a protected account.
    pub async fn ensure_bootstrap_admin(
        &self,
        bootstrap: Option<&BootstrapConfig>,
    ) -> AppResult<()> {
        let Some(cfg) = bootstrap else {
            return Ok(());
        };

        if self.user_repo.find_by_email(&cfg.email).await?.is_some() {
            tracing::debug!(email = %cfg.email, "Bootstrap admin already present");
            return Ok(());
        }

        let password_hash = hash_password(&cfg.password)?;
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(cfg.name.clone()),
            email: Set(cfg.email.to_lowercase()),
            password_hash: Set(password_hash),
            role: Set(Role::SuperAdmin),
            is_protected: Set(true),
            codes_generated: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, email = %created.email, "Seeded founding super admin");
        Ok(())
    }

    fn guard_admin_action(&self, target_id: &str, acting_user: &user::Model) -> AppResult<()> {
        if !Capabilities::for_role(acting_user.role).can_manage_users {
            return Err(AppError::Forbidden(
                "Only a super admin can manage users".to_string(),
            ));
        }
        if acting_user.id == target_id {
            return Err(AppError::Forbidden(
                "You cannot perform this action on your own account".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn staff(id: &str, role: Role, is_protected: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Staff".to_string(),
            email: format!("{id}@example.com"),
            password_hash: "$argon2id$unused".to_string(),
            role,
            is_protected,
            codes_generated: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(user_db: MockDatabase) -> UserAdminService {
        UserAdminService::new(UserRepository::new(Arc::new(user_db.into_connection())))
    }

    #[tokio::test]
    async fn test_set_role_forbidden_for_admin() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = staff("admin1", Role::Admin, false);

        let result = service.set_role("mod1", Role::Admin, &actor).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_set_role_on_self_forbidden() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = staff("root", Role::SuperAdmin, false);

        let result = service.set_role("root", Role::Admin, &actor).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_set_role_on_protected_forbidden_even_for_super_admin() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[staff("founder", Role::SuperAdmin, true)]]);
        let service = service(user_db);
        let actor = staff("root", Role::SuperAdmin, false);

        let result = service.set_role("founder", Role::Moderator, &actor).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_self_forbidden() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = staff("root", Role::SuperAdmin, false);

        let result = service.delete("root", &actor).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_protected_forbidden() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[staff("founder", Role::SuperAdmin, true)]]);
        let service = service(user_db);
        let actor = staff("root", Role::SuperAdmin, false);

        let result = service.delete("founder", &actor).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_set_role_unknown_target_not_found() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);
        let service = service(user_db);
        let actor = staff("root", Role::SuperAdmin, false);

        let result = service.set_role("ghost", Role::Admin, &actor).await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_skipped_when_present() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[staff("founder", Role::SuperAdmin, true)]]);
        let service = service(user_db);

        let cfg = BootstrapConfig {
            name: "Founder".to_string(),
            email: "founder@example.com".to_string(),
            password: "bootstrap-password".to_string(),
        };
        // one query only: the existence check; a create would hit the mock's
        // empty exec queue and fail
        assert!(service.ensure_bootstrap_admin(Some(&cfg)).await.is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_noop_without_config() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        assert!(service.ensure_bootstrap_admin(None).await.is_ok());
    }

    #[test]
    fn test_user_view_embeds_capabilities() {
        let view = UserView::from(staff("admin1", Role::Admin, false));
        assert!(view.capabilities.can_issue_invites);
        assert!(!view.capabilities.can_manage_users);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["isProtected"], false);
        assert_eq!(json["capabilities"]["canIssueInvites"], true);
    }
}
