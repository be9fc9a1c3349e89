//! API middleware and application state.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use launchdesk_core::{AuthService, InviteService, SubmissionService, UserAdminService};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session and identity gate.
    pub auth_service: AuthService,
    /// Submission registry.
    pub submission_service: SubmissionService,
    /// Invite-gated registration.
    pub invite_service: InviteService,
    /// User administration.
    pub user_admin_service: UserAdminService,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

/// Extract the session token from request headers: Bearer `Authorization`
/// first, then the session cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(header) = headers.get("Authorization")
        && let Ok(value) = header.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
}

/// Authentication middleware.
///
/// Resolves the session token to a user and stores it in request extensions;
/// requests without a valid session pass through and fail at the `AuthUser`
/// extractor instead.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = session_token(req.headers(), &state.cookie_name)
        && let Ok(user) = state.auth_service.verify(&token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    fn request() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut req = request();
        req.headers_mut()
            .insert(AUTHORIZATION, "Bearer headertoken".parse().unwrap());
        req.headers_mut()
            .insert(COOKIE, "launchdesk_session=cookietoken".parse().unwrap());

        assert_eq!(
            session_token(req.headers(), "launchdesk_session").as_deref(),
            Some("headertoken")
        );
    }

    #[test]
    fn test_cookie_fallback() {
        let mut req = request();
        req.headers_mut().insert(
            COOKIE,
            "other=x; launchdesk_session=cookietoken".parse().unwrap(),
        );

        assert_eq!(
            session_token(req.headers(), "launchdesk_session").as_deref(),
            Some("cookietoken")
        );
    }

    #[test]
    fn test_no_credentials() {
        assert!(session_token(request().headers(), "launchdesk_session").is_none());
    }
}
