//! Per-step satisfaction evaluation.
//!
//! Given the step's eligible approver pool and the distinct approvers
//! recorded at the step so far, this module decides whether the step is
//! satisfied under the workflow's active conditional rules.

use std::collections::HashSet;

use remit_shared::types::UserId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalRule, RuleCombinator, RuleKind};

/// Number of distinct pool approvals required to meet a percentage
/// threshold: `ceil(threshold% × pool_size)`.
#[must_use]
pub fn required_approvals(threshold: u8, pool_size: usize) -> usize {
    (usize::from(threshold) * pool_size).div_ceil(100)
}

/// Stateless evaluator for step satisfaction.
pub struct StepEvaluator;

impl StepEvaluator {
    /// Decide whether the current step is satisfied.
    ///
    /// With no active rules, any one recorded approval satisfies the step
    /// (first-responder semantics; authorization has already gated who can
    /// record one). With active rules, the rules combine as independent OR
    /// conditions: satisfying any one satisfies the step.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::EmptyApproverPool` when a percentage
    /// condition needed a pool and the pool was empty, and no other rule
    /// satisfied the step. The configuration defect is surfaced instead of
    /// letting the expense stall as generically "pending".
    pub fn step_satisfied(
        rules: &[&ApprovalRule],
        pool: &HashSet<UserId>,
        approvers: &HashSet<UserId>,
        step: u32,
    ) -> Result<bool, WorkflowError> {
        if rules.is_empty() {
            return Ok(!approvers.is_empty());
        }

        let mut saw_empty_pool = false;
        for rule in rules {
            match Self::rule_satisfied(&rule.kind, pool, approvers, step) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(WorkflowError::EmptyApproverPool { .. }) => saw_empty_pool = true,
                Err(other) => return Err(other),
            }
        }

        if saw_empty_pool {
            Err(WorkflowError::EmptyApproverPool { step })
        } else {
            Ok(false)
        }
    }

    fn rule_satisfied(
        kind: &RuleKind,
        pool: &HashSet<UserId>,
        approvers: &HashSet<UserId>,
        step: u32,
    ) -> Result<bool, WorkflowError> {
        match kind {
            RuleKind::Percentage { threshold } => {
                Self::percentage_met(*threshold, pool, approvers, step)
            }
            RuleKind::SpecificApprover { approver } => Ok(approvers.contains(approver)),
            RuleKind::Hybrid {
                threshold,
                approver,
                combinator,
            } => {
                let specific = approvers.contains(approver);
                match combinator {
                    RuleCombinator::Or => {
                        if specific {
                            Ok(true)
                        } else {
                            Self::percentage_met(*threshold, pool, approvers, step)
                        }
                    }
                    RuleCombinator::And => {
                        Ok(specific && Self::percentage_met(*threshold, pool, approvers, step)?)
                    }
                }
            }
        }
    }

    fn percentage_met(
        threshold: u8,
        pool: &HashSet<UserId>,
        approvers: &HashSet<UserId>,
        step: u32,
    ) -> Result<bool, WorkflowError> {
        if pool.is_empty() {
            return Err(WorkflowError::EmptyApproverPool { step });
        }

        let count = approvers.intersection(pool).count();
        Ok(count >= required_approvals(threshold, pool.len()))
    }
}
