//! Role-derived capability set.
//!
//! Handlers and services authorize against capabilities, never against raw
//! role strings; the front-end receives the same set and mirrors it in the UI.

use launchdesk_db::entities::Role;
use serde::Serialize;

/// What an authenticated staff member may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Change submission statuses.
    pub can_review_submissions: bool,
    /// Generate, resend, and revoke invite codes.
    pub can_issue_invites: bool,
    /// Change roles and delete accounts.
    pub can_manage_users: bool,
    /// Apply the irreversible status lock.
    pub can_lock_submissions: bool,
}

impl Capabilities {
    /// Resolve the capability set for a role.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::SuperAdmin => Self {
                can_review_submissions: true,
                can_issue_invites: true,
                can_manage_users: true,
                can_lock_submissions: true,
            },
            Role::Admin => Self {
                can_review_submissions: true,
                can_issue_invites: true,
                can_manage_users: false,
                can_lock_submissions: false,
            },
            Role::Moderator => Self {
                can_review_submissions: true,
                can_issue_invites: false,
                can_manage_users: false,
                can_lock_submissions: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_has_everything() {
        let caps = Capabilities::for_role(Role::SuperAdmin);
        assert!(caps.can_review_submissions);
        assert!(caps.can_issue_invites);
        assert!(caps.can_manage_users);
        assert!(caps.can_lock_submissions);
    }

    #[test]
    fn test_admin_issues_invites_but_cannot_manage_users() {
        let caps = Capabilities::for_role(Role::Admin);
        assert!(caps.can_review_submissions);
        assert!(caps.can_issue_invites);
        assert!(!caps.can_manage_users);
        assert!(!caps.can_lock_submissions);
    }

    #[test]
    fn test_moderator_only_reviews() {
        let caps = Capabilities::for_role(Role::Moderator);
        assert!(caps.can_review_submissions);
        assert!(!caps.can_issue_invites);
        assert!(!caps.can_manage_users);
        assert!(!caps.can_lock_submissions);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(Capabilities::for_role(Role::Moderator))
            .expect("serializable");
        assert_eq!(json["canReviewSubmissions"], true);
        assert_eq!(json["canIssueInvites"], false);
    }
}
