//! Identity and reporting-chain context.
//!
//! The engine consumes identity as an explicit dependency behind the
//! `UserDirectory` trait rather than an ambient user list. Credential
//! issuance and session handling live outside this crate entirely; a
//! directory only answers who a user is, who reports to them, and who
//! holds a given approver role.

pub mod memory;
pub mod types;

use std::collections::HashSet;

use async_trait::async_trait;

use remit_shared::types::UserId;

use crate::store::StoreError;

pub use memory::InMemoryDirectory;
pub use types::{Role, UserProfile};

/// Read access to user identity and the reporting-chain relation.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user's profile.
    async fn profile(&self, id: UserId) -> Result<Option<UserProfile>, StoreError>;

    /// The identities reporting directly to the given manager.
    async fn team_of(&self, manager: UserId) -> Result<HashSet<UserId>, StoreError>;

    /// Every user holding the given approver-role tag.
    async fn members_with_role(&self, tag: &str) -> Result<Vec<UserProfile>, StoreError>;
}
