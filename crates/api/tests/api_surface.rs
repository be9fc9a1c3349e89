//! HTTP surface tests over the in-memory router with a mocked store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Extension, Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use launchdesk_api::{AppState, auth_middleware, router};
use launchdesk_common::Config;
use launchdesk_common::config::{DatabaseConfig, ServerConfig};
use launchdesk_core::{
    AuthService, InviteService, MailerService, SubmissionService, UserAdminService,
};
use launchdesk_db::entities::{Role, session, submission, submission_status_history, user};
use launchdesk_db::repositories::{
    InviteCodeRepository, SessionRepository, SubmissionRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, MockDatabase};
use tower::ServiceExt;

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

fn staff(id: &str, role: Role) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: "Staff".to_string(),
        email: format!("{id}@example.com"),
        password_hash: "$argon2id$unused".to_string(),
        role,
        is_protected: false,
        codes_generated: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn empty() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// Build the application state from per-concern mock databases.
fn app_state(
    auth_user_db: MockDatabase,
    session_db: MockDatabase,
    submission_db: MockDatabase,
    invite_db: MockDatabase,
) -> AppState {
    let config = test_config();
    let mailer = MailerService::new(None, &config.server.url).unwrap();

    let auth_user_repo = UserRepository::new(Arc::new(auth_user_db.into_connection()));
    let session_repo = SessionRepository::new(Arc::new(session_db.into_connection()));
    let submission_repo = SubmissionRepository::new(Arc::new(submission_db.into_connection()));
    let invite_repo = InviteCodeRepository::new(Arc::new(invite_db.into_connection()));
    let aux_user_repo = UserRepository::new(Arc::new(empty().into_connection()));

    let invite_service = InviteService::new(
        invite_repo,
        aux_user_repo.clone(),
        mailer,
        &config,
    );
    let auth_service = AuthService::new(
        auth_user_repo,
        session_repo,
        invite_service.clone(),
        &config,
    );
    let submission_service = SubmissionService::new(submission_repo, aux_user_repo.clone());
    let user_admin_service = UserAdminService::new(aux_user_repo);

    AppState {
        auth_service,
        submission_service,
        invite_service,
        user_admin_service,
        cookie_name: config.auth.cookie_name,
        cookie_secure: config.auth.cookie_secure,
    }
}

/// Full app: routes behind the session middleware, as the server wires it.
fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

/// App with a pre-authenticated user injected, bypassing session resolution.
fn app_as(state: AppState, user: user::Model) -> Router {
    router().layer(Extension(user)).with_state(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn intake_without_contact_is_rejected() {
    let app = app(app_state(empty(), empty(), empty(), empty()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/submissions",
            serde_json::json!({
                "projectName": "Orbit",
                "description": "A project with no way to reach anyone"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn intake_returns_submission_code() {
    let now = Utc::now();
    let stored = submission::Model {
        id: "sub1".to_string(),
        submission_code: "LD-XK42MZ".to_string(),
        project_name: "Orbit".to_string(),
        description: "A project".to_string(),
        email: Some("founder@example.com".to_string()),
        social_x: None,
        social_telegram: None,
        social_discord: None,
        founder_tg: None,
        status: launchdesk_db::entities::SubmissionStatus::Pending,
        status_locked: false,
        approved_by: None,
        rejected_by: None,
        submitted_at: now.into(),
        updated_at: None,
    };
    let history = submission_status_history::Model {
        id: "h1".to_string(),
        submission_id: "sub1".to_string(),
        status: launchdesk_db::entities::SubmissionStatus::Pending,
        changed_by: None,
        changed_at: now.into(),
    };
    let submission_db = empty()
        .append_query_results([[stored]])
        .append_query_results([[history]]);
    let app = app(app_state(empty(), empty(), submission_db, empty()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/submissions",
            serde_json::json!({
                "projectName": "Orbit",
                "description": "A project",
                "email": "founder@example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["code"], "LD-XK42MZ");
}

#[tokio::test]
async fn list_without_session_is_401() {
    let app = app(app_state(empty(), empty(), empty(), empty()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/submissions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn bearer_token_resolves_me() {
    let sess = session::Model {
        id: "sess1".to_string(),
        token: "tok1".to_string(),
        user_id: "u1".to_string(),
        created_at: Utc::now().into(),
        expires_at: (Utc::now() + Duration::hours(1)).into(),
    };
    let session_db = empty().append_query_results([[sess]]);
    let user_db = empty().append_query_results([[staff("u1", Role::Admin)]]);
    let app = app(app_state(user_db, session_db, empty(), empty()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, "Bearer tok1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["id"], "u1");
    assert_eq!(json["data"]["role"], "admin");
    assert_eq!(json["data"]["capabilities"]["canIssueInvites"], true);
}

#[tokio::test]
async fn moderator_cannot_generate_invites() {
    let app = app_as(
        app_state(empty(), empty(), empty(), empty()),
        staff("mod1", Role::Moderator),
    );

    let response = app
        .oneshot(json_request(
            "POST",
            "/invite/invites/generate",
            serde_json::json!({"email": "new@example.com", "role": "moderator"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn invite_for_super_admin_role_is_rejected() {
    let app = app_as(
        app_state(empty(), empty(), empty(), empty()),
        staff("admin1", Role::Admin),
    );

    let response = app
        .oneshot(json_request(
            "POST",
            "/invite/invites/generate",
            serde_json::json!({"email": "new@example.com", "role": "superAdmin"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn admin_cannot_change_roles() {
    let app = app_as(
        app_state(empty(), empty(), empty(), empty()),
        staff("admin1", Role::Admin),
    );

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/users/mod1/role",
            serde_json::json!({"role": "admin"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_without_session_succeeds_and_clears_cookie() {
    let app = app(app_state(empty(), empty(), empty(), empty()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.contains("launchdesk_session="));

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
}
