//! Session and identity gate.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use launchdesk_common::{AppError, AppResult, Config, IdGenerator};
use launchdesk_db::{
    entities::{session, user},
    repositories::{SessionRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::invite::InviteService;

/// Authentication service: login, session verification, logout, and
/// invite-gated registration.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
    invites: InviteService,
    id_gen: IdGenerator,
    session_ttl_hours: i64,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Input for registering through an invite code.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1))]
    pub invite_code: String,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        session_repo: SessionRepository,
        invites: InviteService,
        config: &Config,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            invites,
            id_gen: IdGenerator::new(),
            session_ttl_hours: config.auth.session_ttl_hours,
        }
    }

    /// Authenticate by email and password and open a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, input: LoginInput) -> AppResult<(user::Model, session::Model)> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let session = self.start_session(&user).await?;
        Ok((user, session))
    }

    /// Consume an invite, create the account, and open its first session.
    pub async fn register(&self, input: RegisterInput) -> AppResult<(user::Model, session::Model)> {
        input.validate()?;

        let user = self
            .invites
            .consume(&input.invite_code, &input.name, &input.email, &input.password)
            .await?;

        let session = self.start_session(&user).await?;
        Ok((user, session))
    }

    /// Open a session for an already-authenticated user.
    pub async fn start_session(&self, user: &user::Model) -> AppResult<session::Model> {
        let now = Utc::now();
        let model = session::ActiveModel {
            id: Set(self.id_gen.generate()),
            token: Set(self.id_gen.generate_token()),
            user_id: Set(user.id.clone()),
            created_at: Set(now.into()),
            expires_at: Set((now + Duration::hours(self.session_ttl_hours)).into()),
        };
        self.session_repo.create(model).await
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted lazily on the failed lookup.
    pub async fn verify(&self, token: &str) -> AppResult<user::Model> {
        let session = self
            .session_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if session.expires_at < Utc::now() {
            self.session_repo.delete_by_id(&session.id).await?;
            return Err(AppError::Unauthorized);
        }

        self.user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Delete the session behind a token. Best-effort: a missing or unknown
    /// session is not an error.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.session_repo.delete_by_token(token).await?;
        Ok(())
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::mailer::MailerService;
    use launchdesk_common::config::{DatabaseConfig, ServerConfig};
    use launchdesk_db::entities::Role;
    use launchdesk_db::repositories::InviteCodeRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "https://admin.example.com".to_string(),
                cors_origin: None,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: launchdesk_common::config::AuthConfig::default(),
            invites: launchdesk_common::config::InviteConfig::default(),
            bootstrap: None,
            mail: None,
        }
    }

    fn test_user(id: &str, email: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role: Role::Admin,
            is_protected: false,
            codes_generated: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_session(token: &str, user_id: &str, expires_in_hours: i64) -> session::Model {
        session::Model {
            id: format!("sess-{token}"),
            token: token.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
            expires_at: (Utc::now() + Duration::hours(expires_in_hours)).into(),
        }
    }

    fn service(user_db: MockDatabase, session_db: MockDatabase) -> AuthService {
        let config = test_config();
        let user_repo = UserRepository::new(Arc::new(user_db.into_connection()));
        let session_repo = SessionRepository::new(Arc::new(session_db.into_connection()));
        let invite_repo = InviteCodeRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        let mailer = MailerService::new(None, &config.server.url).unwrap();
        let invites = InviteService::new(invite_repo, user_repo.clone(), mailer, &config);
        AuthService::new(user_repo, session_repo, invites, &config)
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("anything", "not a hash").is_err());
    }

    #[tokio::test]
    async fn test_login_unknown_email_unauthorized() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);
        let service = service(user_db, MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: "whatever".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_unauthorized() {
        let user = test_user("u1", "admin@example.com", "right-password");
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]);
        let service = service(user_db, MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .login(LoginInput {
                email: "admin@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_verify_unknown_token_unauthorized() {
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<session::Model>::new()]);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres), session_db);

        let result = service.verify("no-such-token").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_verify_expired_session_unauthorized_and_deleted() {
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_session("tok1", "u1", -1)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres), session_db);

        let result = service.verify("tok1").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_verify_live_session_resolves_user() {
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_session("tok1", "u1", 1)]]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "admin@example.com", "pw-unused1")]]);
        let service = service(user_db, session_db);

        let user = service.verify("tok1").await.unwrap();
        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_logout_missing_session_is_ok() {
        let session_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres), session_db);

        assert!(service.logout("gone").await.is_ok());
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            name: "Bob".to_string(),
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
            invite_code: "abc".to_string(),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "short".to_string(),
            invite_code: "abc".to_string(),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "password123".to_string(),
            invite_code: "abc".to_string(),
        };
        assert!(input.validate().is_ok());
    }
}
