//! Database entities.

pub mod invite_code;
pub mod session;
pub mod submission;
pub mod submission_status_history;
pub mod user;

pub use invite_code::{Entity as InviteCode, InviteStatus};
pub use session::Entity as Session;
pub use submission::{Entity as Submission, SubmissionStatus};
pub use submission_status_history::Entity as SubmissionStatusHistory;
pub use user::{Entity as User, Role};
