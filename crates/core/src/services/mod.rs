//! Business logic services.

pub mod auth;
pub mod capabilities;
pub mod invite;
pub mod mailer;
pub mod submission;
pub mod user_admin;

pub use auth::{AuthService, LoginInput, RegisterInput, hash_password, verify_password};
pub use capabilities::Capabilities;
pub use invite::{GenerateInviteInput, InviteService, InviteView, IssuerRef};
pub use mailer::MailerService;
pub use submission::{
    CreateSubmissionInput, HistoryEntryView, SocialsInput, SubmissionDetailView, SubmissionService,
    SubmissionView, UserRef,
};
pub use user_admin::{UserAdminService, UserView};
