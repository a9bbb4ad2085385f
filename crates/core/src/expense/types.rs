//! Expense domain types.
//!
//! The `Expense` aggregate owns its status, its append-only audit trail,
//! and a frozen snapshot of the workflow governing it. All mutation after
//! submission goes through the approval engine.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use remit_shared::types::{ExpenseId, Money, UserId};

use crate::workflow::types::{ApprovalStep, WorkflowSnapshot};

/// Expense status in the approval workflow.
///
/// Expenses progress through these states from submission to a terminal
/// decision. The valid transitions are:
/// - Pending → AwaitingNextStep (first step of a multi-step chain satisfied)
/// - Pending → Approved (single-step chain satisfied)
/// - Pending → Rejected (reject at the first step)
/// - AwaitingNextStep → AwaitingNextStep (intermediate step satisfied)
/// - AwaitingNextStep → Approved (last step satisfied)
/// - AwaitingNextStep → Rejected (reject at any later step)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Submitted and waiting on the first approval step.
    Pending,
    /// Between steps of a multi-step chain; indistinguishable from
    /// `Pending` to the submitter except via the audit trail.
    AwaitingNextStep,
    /// Fully approved (terminal).
    Approved,
    /// Rejected by an approver (terminal).
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingNextStep => "awaiting_next_step",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "awaiting_next_step" => Some(Self::AwaitingNextStep),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if no further transitions are permitted.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense classification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Travel costs (flights, hotels, mileage).
    Travel,
    /// Meals and per-diem claims.
    Meals,
    /// Office supplies.
    Supplies,
    /// Hardware and equipment.
    Equipment,
    /// Software licenses and subscriptions.
    Software,
    /// Courses, conferences, certifications.
    Training,
    /// Client entertainment.
    Entertainment,
    /// Anything that fits no other category.
    Other,
}

impl ExpenseCategory {
    /// Returns the string representation of the category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Meals => "meals",
            Self::Supplies => "supplies",
            Self::Equipment => "equipment",
            Self::Software => "software",
            Self::Training => "training",
            Self::Entertainment => "entertainment",
            Self::Other => "other",
        }
    }

    /// Parses a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "travel" => Some(Self::Travel),
            "meals" => Some(Self::Meals),
            "supplies" => Some(Self::Supplies),
            "equipment" => Some(Self::Equipment),
            "software" => Some(Self::Software),
            "training" => Some(Self::Training),
            "entertainment" => Some(Self::Entertainment),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of decision recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A normal approval at the current step.
    Approve,
    /// A rejection; terminates the expense.
    Reject,
    /// An admin override bypassing remaining steps.
    ForceApprove,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ForceApprove => "force_approve",
        }
    }
}

/// One entry in an expense's append-only audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The user who acted.
    pub actor: UserId,
    /// What they did.
    pub action: AuditAction,
    /// The 1-based chain step the expense was at when the event was
    /// recorded. Percentage rules count distinct approvers per step.
    pub step: u32,
    /// Approver comment; required (non-empty) for rejections.
    pub comment: Option<String>,
    /// When the event was recorded.
    pub at: DateTime<Utc>,
}

/// An expense claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// The submitting employee; immutable after creation.
    pub owner: UserId,
    /// The claimed amount in its original currency.
    pub amount: Money,
    /// The amount converted to the company base currency at submission
    /// time and cached; never recomputed retroactively.
    pub display_amount: Money,
    /// Expense classification.
    pub category: ExpenseCategory,
    /// Free-text description.
    pub description: String,
    /// The date the expense was incurred. Never in the future.
    pub expense_date: NaiveDate,
    /// Frozen copy of the governing workflow's steps and rules.
    pub workflow: WorkflowSnapshot,
    /// 1-based index into the snapshot's ordered steps.
    pub current_step: u32,
    /// Current lifecycle status.
    pub status: ExpenseStatus,
    /// Append-only audit trail.
    pub trail: Vec<AuditEvent>,
    /// When the expense was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Expense {
    /// Creates a freshly-submitted expense: `Pending`, at step 1, with an
    /// empty audit trail.
    #[must_use]
    pub fn submitted(
        owner: UserId,
        amount: Money,
        display_amount: Money,
        category: ExpenseCategory,
        description: String,
        expense_date: NaiveDate,
        workflow: WorkflowSnapshot,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            owner,
            amount,
            display_amount,
            category,
            description,
            expense_date,
            workflow,
            current_step: 1,
            status: ExpenseStatus::Pending,
            trail: Vec::new(),
            submitted_at: Utc::now(),
        }
    }

    /// The step definition the expense is currently waiting on, if any.
    #[must_use]
    pub fn step(&self) -> Option<&ApprovalStep> {
        self.workflow.step(self.current_step)
    }

    /// Distinct users with an approval recorded at the given step.
    #[must_use]
    pub fn approvers_at(&self, step: u32) -> HashSet<UserId> {
        self.trail
            .iter()
            .filter(|e| e.step == step && e.action == AuditAction::Approve)
            .map(|e| e.actor)
            .collect()
    }

    /// Returns true if the user has any approval recorded on this expense,
    /// at any step.
    #[must_use]
    pub fn has_approval_from(&self, user: UserId) -> bool {
        self.trail
            .iter()
            .any(|e| e.actor == user && e.action == AuditAction::Approve)
    }

    /// Appends an event to the audit trail.
    pub fn record(&mut self, event: AuditEvent) {
        self.trail.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ExpenseStatus::Pending.as_str(), "pending");
        assert_eq!(
            ExpenseStatus::AwaitingNextStep.as_str(),
            "awaiting_next_step"
        );
        assert_eq!(ExpenseStatus::Approved.as_str(), "approved");
        assert_eq!(ExpenseStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ExpenseStatus::parse("pending"), Some(ExpenseStatus::Pending));
        assert_eq!(
            ExpenseStatus::parse("AWAITING_NEXT_STEP"),
            Some(ExpenseStatus::AwaitingNextStep)
        );
        assert_eq!(
            ExpenseStatus::parse("Approved"),
            Some(ExpenseStatus::Approved)
        );
        assert_eq!(ExpenseStatus::parse("bogus"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!ExpenseStatus::Pending.is_terminal());
        assert!(!ExpenseStatus::AwaitingNextStep.is_terminal());
        assert!(ExpenseStatus::Approved.is_terminal());
        assert!(ExpenseStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_category_roundtrip() {
        for category in [
            ExpenseCategory::Travel,
            ExpenseCategory::Meals,
            ExpenseCategory::Supplies,
            ExpenseCategory::Equipment,
            ExpenseCategory::Software,
            ExpenseCategory::Training,
            ExpenseCategory::Entertainment,
            ExpenseCategory::Other,
        ] {
            assert_eq!(ExpenseCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ExpenseCategory::parse("groceries"), None);
    }

    #[test]
    fn test_approvers_at_filters_by_step_and_action() {
        use remit_shared::types::Currency;
        use rust_decimal::Decimal;

        let a = UserId::new();
        let b = UserId::new();
        let money = Money::new(Decimal::ONE, Currency::Usd);
        let mut expense = Expense::submitted(
            UserId::new(),
            money,
            money,
            ExpenseCategory::Meals,
            "lunch".to_string(),
            Utc::now().date_naive(),
            WorkflowSnapshot::default_chain(),
        );

        expense.record(AuditEvent {
            actor: a,
            action: AuditAction::Approve,
            step: 1,
            comment: None,
            at: Utc::now(),
        });
        expense.record(AuditEvent {
            actor: a,
            action: AuditAction::Approve,
            step: 1,
            comment: None,
            at: Utc::now(),
        });
        expense.record(AuditEvent {
            actor: b,
            action: AuditAction::Reject,
            step: 1,
            comment: Some("no".to_string()),
            at: Utc::now(),
        });
        expense.record(AuditEvent {
            actor: b,
            action: AuditAction::Approve,
            step: 2,
            comment: None,
            at: Utc::now(),
        });

        let step_one = expense.approvers_at(1);
        assert_eq!(step_one.len(), 1);
        assert!(step_one.contains(&a));

        let step_two = expense.approvers_at(2);
        assert_eq!(step_two.len(), 1);
        assert!(step_two.contains(&b));

        assert!(expense.has_approval_from(a));
        assert!(expense.has_approval_from(b));
    }
}
