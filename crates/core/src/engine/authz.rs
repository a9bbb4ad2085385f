//! Authorization scoping for engine operations.
//!
//! Pure functions over `(actor profile, owner, team membership, current
//! step)` so every check is unit-testable without stores. Authorization
//! runs before any mutation; a failed check appends nothing to the audit
//! trail.

use std::collections::HashSet;

use remit_shared::types::UserId;

use crate::directory::types::{Role, UserProfile};
use crate::engine::error::EngineError;
use crate::expense::types::Expense;
use crate::workflow::types::{ApprovalStep, ApproverSpec};

/// Visibility scope for list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No owner restriction (admins).
    All,
    /// Restricted to these owners.
    Owners(Vec<UserId>),
}

/// Stateless authorization checks over the three role variants.
pub struct Authorization;

impl Authorization {
    /// Whether the actor may record a decision on the expense at its
    /// current step.
    ///
    /// * Employees never decide.
    /// * Managers decide only on direct reports, and only when the current
    ///   step's approver spec matches them - or when they already have an
    ///   approval recorded on this expense, which keeps a repeat approval
    ///   after the chain advanced past them from being an error.
    /// * Admins decide on anything.
    pub fn can_decide(
        actor: &UserProfile,
        expense: &Expense,
        team: &HashSet<UserId>,
    ) -> Result<(), EngineError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Employee => Err(EngineError::Forbidden),
            Role::Manager => {
                if !team.contains(&expense.owner) {
                    return Err(EngineError::Forbidden);
                }
                let matches_step = expense
                    .step()
                    .is_some_and(|step| Self::step_matches(actor, step));
                if matches_step || expense.has_approval_from(actor.id) {
                    Ok(())
                } else {
                    Err(EngineError::Forbidden)
                }
            }
        }
    }

    /// Whether the actor may force-approve, bypassing remaining steps.
    pub fn can_force_approve(actor: &UserProfile) -> Result<(), EngineError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Employee | Role::Manager => Err(EngineError::Forbidden),
        }
    }

    /// Whether the actor may create or edit workflow definitions.
    pub fn can_manage_workflows(actor: &UserProfile) -> Result<(), EngineError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Employee | Role::Manager => Err(EngineError::Forbidden),
        }
    }

    /// Whether the actor may view the expense.
    #[must_use]
    pub fn can_view(actor: &UserProfile, owner: UserId, team: &HashSet<UserId>) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Manager => owner == actor.id || team.contains(&owner),
            Role::Employee => owner == actor.id,
        }
    }

    /// The owners whose expenses the actor may list.
    #[must_use]
    pub fn list_scope(actor: &UserProfile, team: &HashSet<UserId>) -> Scope {
        match actor.role {
            Role::Admin => Scope::All,
            Role::Manager => {
                let mut owners: Vec<UserId> = team.iter().copied().collect();
                owners.push(actor.id);
                Scope::Owners(owners)
            }
            Role::Employee => Scope::Owners(vec![actor.id]),
        }
    }

    /// Whether a step's approver spec matches the actor.
    fn step_matches(actor: &UserProfile, step: &ApprovalStep) -> bool {
        match &step.approver {
            ApproverSpec::User(id) => *id == actor.id,
            ApproverSpec::Role(tag) => actor.holds_role(tag),
        }
    }
}
