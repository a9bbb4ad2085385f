//! Persistence seams.
//!
//! The engine consumes storage as a generic store: load, save, and
//! query-by-predicate. `save` persists the whole aggregate in one call,
//! which is what makes the audit-trail append and the status update
//! commit atomically.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use remit_shared::types::{ExpenseId, UserId, WorkflowId};

use crate::expense::types::{Expense, ExpenseCategory, ExpenseStatus};
use crate::workflow::types::WorkflowDefinition;

pub use memory::{InMemoryExpenseStore, InMemoryWorkflowStore};

/// Errors surfaced by a storage backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed; the operation may be retried by the caller.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Predicate for expense queries.
#[derive(Debug, Clone, Default)]
pub struct ExpenseQuery {
    /// Restrict to these owners; `None` means no owner restriction.
    pub owners: Option<Vec<UserId>>,
    /// Restrict to this status.
    pub status: Option<ExpenseStatus>,
    /// Restrict to this category.
    pub category: Option<ExpenseCategory>,
}

impl ExpenseQuery {
    /// Whether the expense satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(owners) = &self.owners
            && !owners.contains(&expense.owner)
        {
            return false;
        }
        if let Some(status) = self.status
            && expense.status != status
        {
            return false;
        }
        if let Some(category) = self.category
            && expense.category != category
        {
            return false;
        }
        true
    }
}

/// Store for expense aggregates.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Load an expense by id.
    async fn load(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError>;

    /// Persist the whole aggregate (status and trail together).
    async fn save(&self, expense: &Expense) -> Result<(), StoreError>;

    /// All expenses matching the query, newest first.
    async fn query(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, StoreError>;
}

/// Store for workflow definitions.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Load a definition by id.
    async fn load(&self, id: WorkflowId) -> Result<Option<WorkflowDefinition>, StoreError>;

    /// Persist a definition (insert or replace).
    async fn save(&self, definition: &WorkflowDefinition) -> Result<(), StoreError>;

    /// All stored definitions.
    async fn list(&self) -> Result<Vec<WorkflowDefinition>, StoreError>;
}
