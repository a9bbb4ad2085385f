//! Property-based tests for authorization scoping.

use std::collections::HashSet;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use remit_shared::types::{Currency, Money, UserId};

use crate::directory::types::{Role, UserProfile};
use crate::engine::authz::Authorization;
use crate::expense::types::{Expense, ExpenseCategory};
use crate::workflow::types::WorkflowSnapshot;

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Employee),
        Just(Role::Manager),
        Just(Role::Admin),
    ]
}

fn actor(role: Role) -> UserProfile {
    UserProfile {
        id: UserId::new(),
        display_name: "Actor".to_string(),
        role,
        approver_roles: Vec::new(),
        manager: None,
        is_active: true,
    }
}

fn some_expense(owner: UserId) -> Expense {
    let money = Money::new(Decimal::TEN, Currency::Usd);
    Expense::submitted(
        owner,
        money,
        money,
        ExpenseCategory::Other,
        "prop".to_string(),
        Utc::now().date_naive(),
        WorkflowSnapshot::default_chain(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Employees are never authorized to decide, even on their own expenses
    // =========================================================================

    #[test]
    fn prop_employees_never_decide(own in any::<bool>(), in_team in any::<bool>()) {
        let employee = actor(Role::Employee);
        let owner = if own { employee.id } else { UserId::new() };
        let expense = some_expense(owner);
        let team = if in_team {
            HashSet::from([owner])
        } else {
            HashSet::new()
        };

        prop_assert!(Authorization::can_decide(&employee, &expense, &team).is_err());
    }

    // =========================================================================
    // Admins are always authorized, with or without team membership
    // =========================================================================

    #[test]
    fn prop_admins_always_decide(in_team in any::<bool>()) {
        let admin = actor(Role::Admin);
        let owner = UserId::new();
        let expense = some_expense(owner);
        let team = if in_team {
            HashSet::from([owner])
        } else {
            HashSet::new()
        };

        prop_assert!(Authorization::can_decide(&admin, &expense, &team).is_ok());
    }

    // =========================================================================
    // Managers never decide outside their reporting chain
    // =========================================================================

    #[test]
    fn prop_managers_need_team_membership(role in arb_role()) {
        let someone = actor(role);
        let expense = some_expense(UserId::new());

        let allowed = Authorization::can_decide(&someone, &expense, &HashSet::new()).is_ok();
        prop_assert_eq!(allowed, matches!(someone.role, Role::Admin));
    }
}
