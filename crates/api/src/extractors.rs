//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use launchdesk_common::AppError;
use launchdesk_db::entities::user;

/// Authenticated staff user extractor.
///
/// The auth middleware resolves the session and stores the user in request
/// extensions; extraction failing renders the 401 envelope.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}
