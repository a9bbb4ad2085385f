//! In-memory directory for tests and the dev server.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;

use remit_shared::types::UserId;

use crate::directory::UserDirectory;
use crate::directory::types::UserProfile;
use crate::store::StoreError;

/// Directory backed by a concurrent in-process map.
///
/// The reporting-chain relation is derived from each profile's `manager`
/// back-reference.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: DashMap<UserId, UserProfile>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory from a list of profiles.
    #[must_use]
    pub fn from_profiles(profiles: Vec<UserProfile>) -> Self {
        let directory = Self::new();
        for profile in profiles {
            directory.insert(profile);
        }
        directory
    }

    /// Adds or replaces a profile.
    pub fn insert(&self, profile: UserProfile) {
        self.users.insert(profile.id, profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn profile(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn team_of(&self, manager: UserId) -> Result<HashSet<UserId>, StoreError> {
        Ok(self
            .users
            .iter()
            .filter(|entry| entry.manager == Some(manager))
            .map(|entry| entry.id)
            .collect())
    }

    async fn members_with_role(&self, tag: &str) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self
            .users
            .iter()
            .filter(|entry| entry.holds_role(tag))
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::types::Role;

    fn profile(role: Role, manager: Option<UserId>, tags: &[&str]) -> UserProfile {
        UserProfile {
            id: UserId::new(),
            display_name: "Test".to_string(),
            role,
            approver_roles: tags.iter().map(ToString::to_string).collect(),
            manager,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_profile_lookup() {
        let directory = InMemoryDirectory::new();
        let user = profile(Role::Employee, None, &[]);
        let id = user.id;
        directory.insert(user.clone());

        assert_eq!(directory.profile(id).await.unwrap(), Some(user));
        assert_eq!(directory.profile(UserId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_team_derived_from_manager_references() {
        let manager = profile(Role::Manager, None, &[]);
        let report_a = profile(Role::Employee, Some(manager.id), &[]);
        let report_b = profile(Role::Employee, Some(manager.id), &[]);
        let outsider = profile(Role::Employee, None, &[]);

        let directory = InMemoryDirectory::from_profiles(vec![
            manager.clone(),
            report_a.clone(),
            report_b.clone(),
            outsider,
        ]);

        let team = directory.team_of(manager.id).await.unwrap();
        assert_eq!(team.len(), 2);
        assert!(team.contains(&report_a.id));
        assert!(team.contains(&report_b.id));
    }

    #[tokio::test]
    async fn test_members_with_role_matches_tags_and_system_roles() {
        let finance = profile(Role::Admin, None, &["finance"]);
        let manager = profile(Role::Manager, None, &[]);
        let employee = profile(Role::Employee, None, &[]);

        let directory = InMemoryDirectory::from_profiles(vec![
            finance.clone(),
            manager.clone(),
            employee,
        ]);

        let finance_members = directory.members_with_role("finance").await.unwrap();
        assert_eq!(finance_members.len(), 1);
        assert_eq!(finance_members[0].id, finance.id);

        let managers = directory.members_with_role("manager").await.unwrap();
        assert_eq!(managers.len(), 1);
        assert_eq!(managers[0].id, manager.id);
    }
}
