//! Expense error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::expense::types::ExpenseStatus;

/// Errors raised by expense validation and lifecycle checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpenseError {
    /// Submitted amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Expense date lies in the future.
    #[error("Expense date {0} is in the future")]
    InvalidDate(NaiveDate),

    /// Category string does not match any known category.
    #[error("Unknown expense category: {0}")]
    InvalidCategory(String),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ExpenseStatus,
        /// The attempted target status.
        to: ExpenseStatus,
    },
}

impl ExpenseError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        400
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}
