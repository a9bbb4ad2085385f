//! Status transition legality for the expense state machine.
//!
//! Transitions are driven exclusively by the approval engine; this module
//! is the single source of truth for which edges exist.

use crate::expense::types::ExpenseStatus;

/// Check if a status transition is valid.
///
/// Valid transitions:
/// - Pending → AwaitingNextStep | Approved | Rejected
/// - AwaitingNextStep → AwaitingNextStep | Approved | Rejected
///
/// Terminal states permit nothing.
#[must_use]
pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
    matches!(
        (from, to),
        (
            ExpenseStatus::Pending | ExpenseStatus::AwaitingNextStep,
            ExpenseStatus::AwaitingNextStep | ExpenseStatus::Approved | ExpenseStatus::Rejected
        )
    )
}
