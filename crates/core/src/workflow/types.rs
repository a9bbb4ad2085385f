//! Workflow definition domain types.

use serde::{Deserialize, Serialize};

use remit_shared::types::{UserId, WorkflowId};

use crate::workflow::error::WorkflowError;

/// Who may satisfy an approval step.
///
/// A tagged union rather than a stringly-typed comparison: role names and
/// user identities cannot be confused for one another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ApproverSpec {
    /// Any user holding the named role tag. The set of valid role names is
    /// configuration, not hard-coded ("manager", "finance", "director", …).
    Role(String),
    /// One specific user.
    User(UserId),
}

/// One ordered stage in an approval chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStep {
    /// 1-based position in the chain; unique and contiguous within a
    /// definition.
    pub order: u32,
    /// Who may satisfy this step.
    pub approver: ApproverSpec,
}

/// AND/OR combinator for hybrid rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCombinator {
    /// Both sub-conditions must hold.
    And,
    /// Either sub-condition suffices.
    Or,
}

/// The condition a conditional rule imposes on a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    /// Satisfied once `threshold` percent of the step's eligible approver
    /// pool has approved (1-100).
    Percentage {
        /// Required percentage of the pool, 1-100.
        threshold: u8,
    },
    /// Satisfied only when the designated user approves, regardless of
    /// anyone else.
    SpecificApprover {
        /// The required approver.
        approver: UserId,
    },
    /// Percentage and specific-approver conditions combined with AND/OR.
    Hybrid {
        /// Required percentage of the pool, 1-100.
        threshold: u8,
        /// The designated approver.
        approver: UserId,
        /// How the two conditions combine.
        combinator: RuleCombinator,
    },
}

/// A conditional approval rule attached to a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRule {
    /// Human-readable name for the rule.
    pub name: String,
    /// The condition this rule imposes.
    pub kind: RuleKind,
    /// Inactive rules are ignored during evaluation.
    #[serde(default = "default_rule_active")]
    pub is_active: bool,
}

fn default_rule_active() -> bool {
    true
}

/// A named, ordered approval chain plus its conditional rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Definition ID.
    pub id: WorkflowId,
    /// Human-readable name.
    pub name: String,
    /// Ordered approval steps.
    pub steps: Vec<ApprovalStep>,
    /// Conditional rules evaluated at each step.
    pub rules: Vec<ApprovalRule>,
}

impl WorkflowDefinition {
    /// Validate the structural invariants enforced at save time.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::BlankName` if the name is empty or whitespace
    /// * `WorkflowError::EmptyDefinition` if there are no steps and no rules
    /// * `WorkflowError::DuplicateStepOrder` for repeated step orders
    /// * `WorkflowError::NonContiguousSteps` if orders do not form a
    ///   1-based contiguous sequence
    /// * `WorkflowError::InvalidThreshold` for a percentage outside 1-100
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::BlankName);
        }

        if self.steps.is_empty() && self.rules.is_empty() {
            return Err(WorkflowError::EmptyDefinition);
        }

        let mut orders: Vec<u32> = self.steps.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        for (index, order) in orders.iter().enumerate() {
            let expected = index as u32 + 1;
            if index > 0 && orders[index - 1] == *order {
                return Err(WorkflowError::DuplicateStepOrder(*order));
            }
            if *order != expected {
                return Err(WorkflowError::NonContiguousSteps {
                    expected,
                    got: *order,
                });
            }
        }

        for rule in &self.rules {
            let threshold = match rule.kind {
                RuleKind::Percentage { threshold } | RuleKind::Hybrid { threshold, .. } => {
                    Some(threshold)
                }
                RuleKind::SpecificApprover { .. } => None,
            };
            if let Some(t) = threshold
                && !(1..=100).contains(&t)
            {
                return Err(WorkflowError::InvalidThreshold(t));
            }
        }

        Ok(())
    }
}

/// The frozen copy of a definition's steps and rules bound to an expense
/// at submission time.
///
/// Later edits to the definition never re-point an in-flight expense's
/// current step at a renumbered or missing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    /// The definition this snapshot was taken from, if any.
    pub definition_id: Option<WorkflowId>,
    /// Definition name at snapshot time.
    pub name: String,
    /// Frozen steps, ordered by `order`.
    pub steps: Vec<ApprovalStep>,
    /// Frozen rules.
    pub rules: Vec<ApprovalRule>,
}

impl WorkflowSnapshot {
    /// The default single-step "any manager" chain used when a submission
    /// names no workflow.
    #[must_use]
    pub fn default_chain() -> Self {
        Self {
            definition_id: None,
            name: "default".to_string(),
            steps: vec![ApprovalStep {
                order: 1,
                approver: ApproverSpec::Role("manager".to_string()),
            }],
            rules: Vec::new(),
        }
    }

    /// Freezes a definition's steps and rules.
    ///
    /// A definition with rules but no steps is snapshotted with the
    /// default "any manager" step so its rules have a chain to govern.
    #[must_use]
    pub fn of(definition: &WorkflowDefinition) -> Self {
        let steps = if definition.steps.is_empty() {
            Self::default_chain().steps
        } else {
            let mut steps = definition.steps.clone();
            steps.sort_unstable_by_key(|s| s.order);
            steps
        };

        Self {
            definition_id: Some(definition.id),
            name: definition.name.clone(),
            steps,
            rules: definition.rules.clone(),
        }
    }

    /// Looks up a step by its 1-based order.
    #[must_use]
    pub fn step(&self, order: u32) -> Option<&ApprovalStep> {
        self.steps.iter().find(|s| s.order == order)
    }

    /// The order of the final step in the chain.
    #[must_use]
    pub fn last_step(&self) -> u32 {
        self.steps.iter().map(|s| s.order).max().unwrap_or(1)
    }

    /// Returns true if the given order is the final step.
    #[must_use]
    pub fn is_last_step(&self, order: u32) -> bool {
        order >= self.last_step()
    }

    /// The rules considered during evaluation.
    pub fn active_rules(&self) -> impl Iterator<Item = &ApprovalRule> {
        self.rules.iter().filter(|r| r.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(order: u32, role: &str) -> ApprovalStep {
        ApprovalStep {
            order,
            approver: ApproverSpec::Role(role.to_string()),
        }
    }

    fn percentage_rule(threshold: u8) -> ApprovalRule {
        ApprovalRule {
            name: "threshold".to_string(),
            kind: RuleKind::Percentage { threshold },
            is_active: true,
        }
    }

    #[test]
    fn test_validate_accepts_simple_chain() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Two step".to_string(),
            steps: vec![step(1, "manager"), step(2, "finance")],
            rules: vec![],
        };
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_definition() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Empty".to_string(),
            steps: vec![],
            rules: vec![],
        };
        assert_eq!(definition.validate(), Err(WorkflowError::EmptyDefinition));
    }

    #[test]
    fn test_validate_accepts_rules_without_steps() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Rules only".to_string(),
            steps: vec![],
            rules: vec![percentage_rule(60)],
        };
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "   ".to_string(),
            steps: vec![step(1, "manager")],
            rules: vec![],
        };
        assert_eq!(definition.validate(), Err(WorkflowError::BlankName));
    }

    #[test]
    fn test_validate_rejects_gap_in_orders() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Gapped".to_string(),
            steps: vec![step(1, "manager"), step(3, "finance")],
            rules: vec![],
        };
        assert_eq!(
            definition.validate(),
            Err(WorkflowError::NonContiguousSteps {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_based_orders() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Zero based".to_string(),
            steps: vec![step(0, "manager"), step(1, "finance")],
            rules: vec![],
        };
        assert!(matches!(
            definition.validate(),
            Err(WorkflowError::NonContiguousSteps { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_orders() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Duplicated".to_string(),
            steps: vec![step(1, "manager"), step(1, "finance")],
            rules: vec![],
        };
        assert_eq!(
            definition.validate(),
            Err(WorkflowError::DuplicateStepOrder(1))
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        for threshold in [0u8, 101] {
            let definition = WorkflowDefinition {
                id: WorkflowId::new(),
                name: "Threshold".to_string(),
                steps: vec![step(1, "manager")],
                rules: vec![percentage_rule(threshold)],
            };
            assert_eq!(
                definition.validate(),
                Err(WorkflowError::InvalidThreshold(threshold))
            );
        }
    }

    #[test]
    fn test_default_chain_is_single_manager_step() {
        let snapshot = WorkflowSnapshot::default_chain();
        assert_eq!(snapshot.steps.len(), 1);
        assert_eq!(snapshot.last_step(), 1);
        assert!(snapshot.is_last_step(1));
        assert_eq!(
            snapshot.step(1).unwrap().approver,
            ApproverSpec::Role("manager".to_string())
        );
    }

    #[test]
    fn test_snapshot_sorts_steps() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Unsorted".to_string(),
            steps: vec![step(2, "finance"), step(1, "manager")],
            rules: vec![],
        };
        let snapshot = WorkflowSnapshot::of(&definition);
        assert_eq!(snapshot.steps[0].order, 1);
        assert_eq!(snapshot.steps[1].order, 2);
        assert_eq!(snapshot.definition_id, Some(definition.id));
    }

    #[test]
    fn test_snapshot_substitutes_default_step_for_rule_only_definition() {
        let definition = WorkflowDefinition {
            id: WorkflowId::new(),
            name: "Rules only".to_string(),
            steps: vec![],
            rules: vec![percentage_rule(50)],
        };
        let snapshot = WorkflowSnapshot::of(&definition);
        assert_eq!(snapshot.steps.len(), 1);
        assert_eq!(snapshot.rules.len(), 1);
    }

    #[test]
    fn test_active_rules_filters_inactive() {
        let mut inactive = percentage_rule(50);
        inactive.is_active = false;
        let snapshot = WorkflowSnapshot {
            definition_id: None,
            name: "mixed".to_string(),
            steps: vec![step(1, "manager")],
            rules: vec![percentage_rule(60), inactive],
        };
        assert_eq!(snapshot.active_rules().count(), 1);
    }
}
