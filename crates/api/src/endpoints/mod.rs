//! API endpoints.

mod auth;
mod invites;
mod submissions;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router. The server mounts this under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/submissions", submissions::router())
        .nest("/invite", invites::router())
        .nest("/users", users::router())
}
