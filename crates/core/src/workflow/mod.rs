//! Approval workflow definitions and rule evaluation.
//!
//! This module implements the configurable approval chains: ordered lists
//! of approval steps plus the conditional rules that can short-circuit or
//! alter how a step is satisfied.
//!
//! # Modules
//!
//! - `types` - Workflow definitions, steps, approver specs, rules, snapshots
//! - `rules` - Per-step satisfaction evaluation
//! - `error` - Workflow-specific error types

pub mod error;
pub mod rules;
pub mod types;

#[cfg(test)]
mod rules_props;

pub use error::WorkflowError;
pub use rules::{StepEvaluator, required_approvals};
pub use types::{
    ApprovalRule, ApprovalStep, ApproverSpec, RuleCombinator, RuleKind, WorkflowDefinition,
    WorkflowSnapshot,
};
