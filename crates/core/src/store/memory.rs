//! In-memory stores for tests and the dev server.

use async_trait::async_trait;
use dashmap::DashMap;

use remit_shared::types::{ExpenseId, WorkflowId};

use crate::expense::types::Expense;
use crate::store::{ExpenseQuery, ExpenseStore, StoreError, WorkflowStore};
use crate::workflow::types::WorkflowDefinition;

/// Expense store backed by a concurrent in-process map.
#[derive(Debug, Default)]
pub struct InMemoryExpenseStore {
    expenses: DashMap<ExpenseId, Expense>,
}

impl InMemoryExpenseStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn load(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        Ok(self.expenses.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, expense: &Expense) -> Result<(), StoreError> {
        self.expenses.insert(expense.id, expense.clone());
        Ok(())
    }

    async fn query(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, StoreError> {
        let mut results: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(results)
    }
}

/// Workflow definition store backed by a concurrent in-process map.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    definitions: DashMap<WorkflowId, WorkflowDefinition>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn load(&self, id: WorkflowId) -> Result<Option<WorkflowDefinition>, StoreError> {
        Ok(self.definitions.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, definition: &WorkflowDefinition) -> Result<(), StoreError> {
        self.definitions.insert(definition.id, definition.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WorkflowDefinition>, StoreError> {
        Ok(self
            .definitions
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
