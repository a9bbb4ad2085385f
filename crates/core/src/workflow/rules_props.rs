//! Property-based tests for step satisfaction evaluation.
//!
//! These tests validate the percentage-threshold arithmetic and the
//! OR-combination semantics across randomized pools and thresholds.

use std::collections::HashSet;

use proptest::prelude::*;

use remit_shared::types::UserId;

use crate::workflow::rules::{StepEvaluator, required_approvals};
use crate::workflow::types::{ApprovalRule, RuleKind};

fn pool_of(size: usize) -> Vec<UserId> {
    (0..size).map(|_| UserId::new()).collect()
}

fn percentage(threshold: u8) -> ApprovalRule {
    ApprovalRule {
        name: "threshold".to_string(),
        kind: RuleKind::Percentage { threshold },
        is_active: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Required approvals is always within [1, pool_size]
    // =========================================================================

    #[test]
    fn prop_required_approvals_bounds(
        threshold in 1u8..=100,
        pool_size in 1usize..=50,
    ) {
        let required = required_approvals(threshold, pool_size);
        prop_assert!(required >= 1);
        prop_assert!(required <= pool_size);
    }

    // =========================================================================
    // Raising the threshold never lowers the requirement
    // =========================================================================

    #[test]
    fn prop_required_approvals_monotonic(
        low in 1u8..=99,
        bump in 1u8..=50,
        pool_size in 1usize..=50,
    ) {
        let high = low.saturating_add(bump).min(100);
        prop_assert!(
            required_approvals(low, pool_size) <= required_approvals(high, pool_size)
        );
    }

    // =========================================================================
    // A percentage step is satisfied exactly at the computed requirement
    // =========================================================================

    #[test]
    fn prop_percentage_satisfied_exactly_at_requirement(
        threshold in 1u8..=100,
        pool_size in 1usize..=20,
    ) {
        let members = pool_of(pool_size);
        let pool: HashSet<UserId> = members.iter().copied().collect();
        let rule = percentage(threshold);
        let rules = vec![&rule];
        let required = required_approvals(threshold, pool_size);

        for count in 0..=pool_size {
            let approvers: HashSet<UserId> =
                members.iter().take(count).copied().collect();
            let satisfied =
                StepEvaluator::step_satisfied(&rules, &pool, &approvers, 1).unwrap();
            prop_assert_eq!(satisfied, count >= required);
        }
    }

    // =========================================================================
    // Approvals from outside the pool never count toward a percentage
    // =========================================================================

    #[test]
    fn prop_outsiders_never_count(
        threshold in 1u8..=100,
        pool_size in 1usize..=10,
        outsiders in 1usize..=10,
    ) {
        let pool: HashSet<UserId> = pool_of(pool_size).into_iter().collect();
        let approvers: HashSet<UserId> = pool_of(outsiders).into_iter().collect();
        let rule = percentage(threshold);
        let rules = vec![&rule];

        let satisfied =
            StepEvaluator::step_satisfied(&rules, &pool, &approvers, 1).unwrap();
        prop_assert!(!satisfied);
    }

    // =========================================================================
    // A designated approver satisfies a specific rule over any pool
    // =========================================================================

    #[test]
    fn prop_specific_rule_independent_of_pool(pool_size in 0usize..=20) {
        let designated = UserId::new();
        let pool: HashSet<UserId> = pool_of(pool_size).into_iter().collect();
        let rule = ApprovalRule {
            name: "designated".to_string(),
            kind: RuleKind::SpecificApprover { approver: designated },
            is_active: true,
        };
        let rules = vec![&rule];

        let approvers: HashSet<UserId> = [designated].into();
        prop_assert!(
            StepEvaluator::step_satisfied(&rules, &pool, &approvers, 1).unwrap()
        );
    }
}
