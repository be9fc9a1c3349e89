//! Database repositories.
//!
//! Thin wrappers over the shared [`sea_orm::DatabaseConnection`] that return
//! [`launchdesk_common::AppResult`]. Multi-statement writes that must be
//! atomic (submission create + initial history, status transition + history
//! append, invite consume + user create) live here as transactional methods.

mod invite_code;
mod session;
mod submission;
mod user;

pub use invite_code::InviteCodeRepository;
pub use session::SessionRepository;
pub use submission::SubmissionRepository;
pub use user::UserRepository;
