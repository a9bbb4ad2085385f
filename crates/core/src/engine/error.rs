//! Engine error taxonomy.
//!
//! Every variant is a recoverable, caller-visible error; none is fatal to
//! the process. The engine performs no internal retries.

use thiserror::Error;

use remit_shared::types::{ExpenseId, WorkflowId};

use crate::expense::error::ExpenseError;
use crate::expense::types::ExpenseStatus;
use crate::store::StoreError;
use crate::workflow::error::WorkflowError;

/// Errors returned by approval engine operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The expense id did not resolve.
    #[error("Expense {0} not found")]
    ExpenseNotFound(ExpenseId),

    /// The workflow definition id did not resolve.
    #[error("Workflow definition {0} not found")]
    WorkflowNotFound(WorkflowId),

    /// The actor may not perform this operation. Deliberately opaque: no
    /// information about the correct approver is leaked.
    #[error("Not authorized to perform this operation")]
    Forbidden,

    /// Mutation attempted on a terminal expense.
    #[error("Expense is already {0}")]
    AlreadyFinalized(ExpenseStatus),

    /// Rejection without a non-empty reason.
    #[error("Rejection requires a non-empty reason")]
    MissingReason,

    /// Submission validation or lifecycle failure.
    #[error(transparent)]
    Expense(#[from] ExpenseError),

    /// Definition validation or rule evaluation failure.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Storage backend failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ExpenseNotFound(_) | Self::WorkflowNotFound(_) => 404,
            Self::Forbidden => 403,
            Self::AlreadyFinalized(_) => 409,
            Self::MissingReason => 400,
            Self::Expense(e) => e.status_code(),
            Self::Workflow(e) => e.status_code(),
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::WorkflowNotFound(_) => "WORKFLOW_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::AlreadyFinalized(_) => "ALREADY_FINALIZED",
            Self::MissingReason => "MISSING_REASON",
            Self::Expense(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::Store(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_errors() {
        let err = EngineError::ExpenseNotFound(ExpenseId::new());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "EXPENSE_NOT_FOUND");
    }

    #[test]
    fn test_forbidden_is_opaque() {
        let err = EngineError::Forbidden;
        assert_eq!(err.status_code(), 403);
        // The message names no approver, role, or step
        assert_eq!(err.to_string(), "Not authorized to perform this operation");
    }

    #[test]
    fn test_finalized_conflict() {
        let err = EngineError::AlreadyFinalized(ExpenseStatus::Approved);
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_wrapped_errors_delegate_codes() {
        let err: EngineError = WorkflowError::EmptyApproverPool { step: 1 }.into();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "EMPTY_APPROVER_POOL");

        let err: EngineError = ExpenseError::InvalidCategory("x".to_string()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_CATEGORY");
    }
}
