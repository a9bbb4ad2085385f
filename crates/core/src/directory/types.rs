//! User identity types.

use serde::{Deserialize, Serialize};

use remit_shared::types::UserId;

/// System role of a user.
///
/// This is the authorization axis: employees submit, managers decide on
/// their reports, admins decide on anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can submit and view their own expenses.
    Employee,
    /// Can decide on direct reports' expenses.
    Manager,
    /// Can decide on anything, manage workflows, and force-approve.
    Admin,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user as the engine sees one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
    /// System role.
    pub role: Role,
    /// Configurable approver-role tags this user can satisfy
    /// ("finance", "director", …).
    #[serde(default)]
    pub approver_roles: Vec<String>,
    /// The user's direct manager, if any.
    #[serde(default)]
    pub manager: Option<UserId>,
    /// Inactive users drop out of approver pools and cannot act.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Whether this user satisfies the given approver-role tag.
    ///
    /// Managers implicitly hold the "manager" tag and admins the "admin"
    /// tag, so the default chain works without tag bookkeeping.
    #[must_use]
    pub fn holds_role(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        if self.role.as_str() == tag {
            return true;
        }
        self.approver_roles.iter().any(|r| r.to_lowercase() == tag)
    }
}
