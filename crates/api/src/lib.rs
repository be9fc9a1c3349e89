//! HTTP API layer for launchdesk.
//!
//! This crate provides the admin REST API:
//!
//! - **Endpoints**: auth, submissions, invites, users
//! - **Extractors**: the authenticated staff user
//! - **Middleware**: session resolution (Bearer header, then cookie)
//! - **Response**: the `{success, data?, message?}` envelope
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
