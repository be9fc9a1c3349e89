//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use launchdesk_common::AppResult;
use launchdesk_core::{LoginInput, RegisterInput, UserView};
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::{AppState, session_token},
    response::ApiResponse,
};

/// Login/register payload: the user plus the session token for clients that
/// prefer the `Authorization` header over the cookie.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: UserView,
    pub token: String,
}

/// Verify payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyData {
    pub valid: bool,
    pub user: UserView,
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Sign in with email and password.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginInput>,
) -> AppResult<(CookieJar, ApiResponse<AuthData>)> {
    let (user, session) = state.auth_service.login(req).await?;

    let jar = jar.add(session_cookie(&state, session.token.clone()));
    Ok((
        jar,
        ApiResponse::ok(AuthData {
            user: UserView::from(user),
            token: session.token,
        }),
    ))
}

/// Register through an invite code.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterInput>,
) -> AppResult<(CookieJar, ApiResponse<AuthData>)> {
    let (user, session) = state.auth_service.register(req).await?;

    let jar = jar.add(session_cookie(&state, session.token.clone()));
    Ok((
        jar,
        ApiResponse::ok(AuthData {
            user: UserView::from(user),
            token: session.token,
        }),
    ))
}

/// Confirm the current session is valid.
async fn verify(AuthUser(user): AuthUser) -> ApiResponse<VerifyData> {
    ApiResponse::ok(VerifyData {
        valid: true,
        user: UserView::from(user),
    })
}

/// The current user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserView> {
    ApiResponse::ok(UserView::from(user))
}

/// Sign out. Never fails for a missing or unknown session; the cookie is
/// cleared either way.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<()>) {
    if let Some(token) = session_token(&headers, &state.cookie_name)
        && let Err(e) = state.auth_service.logout(&token).await
    {
        tracing::warn!(error = %e, "Session delete failed during logout");
    }

    let jar = jar.remove(Cookie::build((state.cookie_name.clone(), "")).path("/").build());
    (jar, ApiResponse::message("Logged out"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/verify", get(verify))
        .route("/me", get(me))
        .route("/logout", post(logout))
}
