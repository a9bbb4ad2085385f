//! The approval engine.
//!
//! Given an expense, its frozen workflow snapshot, and an incoming
//! decision from an authorized actor, the engine computes the next state
//! and records the audit event. All expense mutation after submission
//! happens here.
//!
//! # Modules
//!
//! - `authz` - Authorization scoping over the three role variants
//! - `error` - Engine error taxonomy
//! - `service` - The `ApprovalEngine` itself

pub mod authz;
pub mod error;
pub mod service;

#[cfg(test)]
mod authz_props;

pub use authz::{Authorization, Scope};
pub use error::EngineError;
pub use service::{ApprovalEngine, Decision, ExpenseFilter, SubmitExpense};
