//! The approval engine.
//!
//! All expense mutation after submission flows through `ApprovalEngine`:
//! it authorizes the actor, records the audit event, evaluates the current
//! step against the frozen workflow snapshot, and advances or terminates
//! the expense. Calls on the same expense are serialized by an
//! expense-scoped critical section; calls on different expenses proceed in
//! parallel.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use remit_shared::types::{Currency, ExpenseId, Money, UserId, WorkflowId};

use crate::currency::{CurrencyService, RateProvider};
use crate::directory::UserDirectory;
use crate::directory::types::{Role, UserProfile};
use crate::engine::authz::{Authorization, Scope};
use crate::engine::error::EngineError;
use crate::expense::lifecycle;
use crate::expense::service::ExpenseService;
use crate::expense::types::{AuditAction, AuditEvent, Expense, ExpenseStatus};
use crate::expense::{ExpenseCategory, ExpenseError};
use crate::store::{ExpenseQuery, ExpenseStore, WorkflowStore};
use crate::workflow::rules::StepEvaluator;
use crate::workflow::types::{
    ApprovalRule, ApproverSpec, WorkflowDefinition, WorkflowSnapshot,
};

/// The decision an actor records on an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Approve the current step.
    Approve,
    /// Reject the expense outright.
    Reject,
}

impl Decision {
    /// Parse a decision from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    /// Returns the string representation of the decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Input for submitting a new expense claim.
#[derive(Debug, Clone)]
pub struct SubmitExpense {
    /// The submitting employee.
    pub owner: UserId,
    /// Claimed amount.
    pub amount: Decimal,
    /// Currency of the claimed amount.
    pub currency: Currency,
    /// Category name; validated against the known set.
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// The date the expense was incurred.
    pub expense_date: NaiveDate,
    /// Workflow definition to govern the claim; `None` selects the
    /// default single-step "any manager" chain.
    pub workflow_id: Option<WorkflowId>,
}

/// Filters for expense listing.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Restrict to this status.
    pub status: Option<ExpenseStatus>,
    /// Restrict to this category.
    pub category: Option<ExpenseCategory>,
}

/// The approval engine.
pub struct ApprovalEngine {
    expenses: Arc<dyn ExpenseStore>,
    workflows: Arc<dyn WorkflowStore>,
    directory: Arc<dyn UserDirectory>,
    rates: Arc<dyn RateProvider>,
    base_currency: Currency,
    locks: DashMap<ExpenseId, Arc<Mutex<()>>>,
}

impl ApprovalEngine {
    /// Creates an engine over the given collaborators.
    #[must_use]
    pub fn new(
        expenses: Arc<dyn ExpenseStore>,
        workflows: Arc<dyn WorkflowStore>,
        directory: Arc<dyn UserDirectory>,
        rates: Arc<dyn RateProvider>,
        base_currency: Currency,
    ) -> Self {
        Self {
            expenses,
            workflows,
            directory,
            rates,
            base_currency,
            locks: DashMap::new(),
        }
    }

    /// Submit a new expense claim.
    ///
    /// The governing workflow's steps and rules are frozen onto the
    /// expense here; later definition edits do not touch it. The display
    /// amount is converted to the base currency once and cached.
    ///
    /// # Errors
    ///
    /// * `EngineError::Expense` for an invalid amount, date, or category
    /// * `EngineError::WorkflowNotFound` for a dangling workflow id
    /// * `EngineError::Store` on backend failure
    pub async fn submit(&self, input: SubmitExpense) -> Result<Expense, EngineError> {
        let amount = Money::new(input.amount, input.currency);
        ExpenseService::validate_submission(
            &amount,
            input.expense_date,
            Utc::now().date_naive(),
        )?;
        let category = ExpenseService::parse_category(&input.category)?;

        let workflow = match input.workflow_id {
            Some(id) => {
                let definition = self
                    .workflows
                    .load(id)
                    .await?
                    .ok_or(EngineError::WorkflowNotFound(id))?;
                WorkflowSnapshot::of(&definition)
            }
            None => WorkflowSnapshot::default_chain(),
        };

        let display_amount =
            CurrencyService::display_amount(self.rates.as_ref(), &amount, self.base_currency);

        let expense = Expense::submitted(
            input.owner,
            amount,
            display_amount,
            category,
            input.description,
            input.expense_date,
            workflow,
        );
        self.expenses.save(&expense).await?;
        Ok(expense)
    }

    /// Record an approve/reject decision on an expense.
    ///
    /// A rejection by any single authorized approver terminates the
    /// expense; there is no outvoting a rejection. An approval is always
    /// recorded, then the current step is evaluated and the expense
    /// advances only if the step is satisfied.
    ///
    /// # Errors
    ///
    /// * `EngineError::ExpenseNotFound` if the id does not resolve
    /// * `EngineError::AlreadyFinalized` on a terminal expense
    /// * `EngineError::Forbidden` if the actor may not act here
    /// * `EngineError::MissingReason` for a reject without a reason
    /// * `EngineError::Workflow` when a percentage step has no eligible
    ///   approvers (the approval is still recorded)
    pub async fn decide(
        &self,
        expense_id: ExpenseId,
        actor: UserId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<Expense, EngineError> {
        let lock = self.lock_for(expense_id);
        let _guard = lock.lock().await;

        let mut expense = self
            .expenses
            .load(expense_id)
            .await?
            .ok_or(EngineError::ExpenseNotFound(expense_id))?;

        if expense.status.is_terminal() {
            return Err(EngineError::AlreadyFinalized(expense.status));
        }

        let profile = self.active_profile(actor).await?;
        let team = self.directory.team_of(actor).await?;
        Authorization::can_decide(&profile, &expense, &team)?;

        match decision {
            Decision::Reject => {
                if comment.as_deref().is_none_or(|c| c.trim().is_empty()) {
                    return Err(EngineError::MissingReason);
                }
                expense.record(AuditEvent {
                    actor,
                    action: AuditAction::Reject,
                    step: expense.current_step,
                    comment,
                    at: Utc::now(),
                });
                Self::transition(&mut expense, ExpenseStatus::Rejected)?;
            }
            Decision::Approve => {
                expense.record(AuditEvent {
                    actor,
                    action: AuditAction::Approve,
                    step: expense.current_step,
                    comment,
                    at: Utc::now(),
                });

                let Some(step) = expense.step().cloned() else {
                    // Snapshot corruption; record the approval but refuse
                    // to guess at a pool.
                    self.expenses.save(&expense).await?;
                    return Err(crate::workflow::WorkflowError::EmptyApproverPool {
                        step: expense.current_step,
                    }
                    .into());
                };

                let pool = self.approver_pool(expense.owner, &step.approver).await?;
                let approvers = expense.approvers_at(expense.current_step);
                let satisfied = {
                    let active: Vec<&ApprovalRule> = expense.workflow.active_rules().collect();
                    StepEvaluator::step_satisfied(
                        &active,
                        &pool,
                        &approvers,
                        expense.current_step,
                    )
                };

                match satisfied {
                    Ok(true) => {
                        if expense.workflow.is_last_step(expense.current_step) {
                            Self::transition(&mut expense, ExpenseStatus::Approved)?;
                        } else {
                            expense.current_step += 1;
                            Self::transition(&mut expense, ExpenseStatus::AwaitingNextStep)?;
                        }
                    }
                    Ok(false) => {}
                    Err(defect) => {
                        // The approval stays recorded; the configuration
                        // defect surfaces instead of a silent stall.
                        self.expenses.save(&expense).await?;
                        return Err(defect.into());
                    }
                }
            }
        }

        self.expenses.save(&expense).await?;
        Ok(expense)
    }

    /// Admin override: approve immediately, bypassing remaining steps.
    ///
    /// Recorded as a distinct `ForceApprove` audit event.
    ///
    /// # Errors
    ///
    /// * `EngineError::Forbidden` unless the actor is an admin
    /// * `EngineError::ExpenseNotFound` / `EngineError::AlreadyFinalized`
    ///   as for `decide`
    pub async fn force_approve(
        &self,
        expense_id: ExpenseId,
        actor: UserId,
        comment: Option<String>,
    ) -> Result<Expense, EngineError> {
        let lock = self.lock_for(expense_id);
        let _guard = lock.lock().await;

        let mut expense = self
            .expenses
            .load(expense_id)
            .await?
            .ok_or(EngineError::ExpenseNotFound(expense_id))?;

        if expense.status.is_terminal() {
            return Err(EngineError::AlreadyFinalized(expense.status));
        }

        let profile = self.active_profile(actor).await?;
        Authorization::can_force_approve(&profile)?;

        expense.record(AuditEvent {
            actor,
            action: AuditAction::ForceApprove,
            step: expense.current_step,
            comment,
            at: Utc::now(),
        });
        Self::transition(&mut expense, ExpenseStatus::Approved)?;

        self.expenses.save(&expense).await?;
        Ok(expense)
    }

    /// Fetch a single expense, scoped to what the actor may view.
    pub async fn get(&self, expense_id: ExpenseId, actor: UserId) -> Result<Expense, EngineError> {
        let expense = self
            .expenses
            .load(expense_id)
            .await?
            .ok_or(EngineError::ExpenseNotFound(expense_id))?;

        let profile = self.active_profile(actor).await?;
        let team = self.directory.team_of(actor).await?;
        if Authorization::can_view(&profile, expense.owner, &team) {
            Ok(expense)
        } else {
            Err(EngineError::Forbidden)
        }
    }

    /// List expenses visible to the actor, newest first.
    pub async fn list_for(
        &self,
        actor: UserId,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, EngineError> {
        let profile = self.active_profile(actor).await?;
        let team = self.directory.team_of(actor).await?;

        let owners = match Authorization::list_scope(&profile, &team) {
            Scope::All => None,
            Scope::Owners(owners) => Some(owners),
        };
        let query = ExpenseQuery {
            owners,
            status: filter.status,
            category: filter.category,
        };
        Ok(self.expenses.query(&query).await?)
    }

    /// Create or replace a workflow definition. Admin only.
    ///
    /// # Errors
    ///
    /// * `EngineError::Forbidden` unless the actor is an admin
    /// * `EngineError::Workflow` on structural validation failure
    pub async fn save_workflow(
        &self,
        actor: UserId,
        definition: WorkflowDefinition,
    ) -> Result<WorkflowDefinition, EngineError> {
        let profile = self.active_profile(actor).await?;
        Authorization::can_manage_workflows(&profile)?;

        definition.validate()?;
        self.workflows.save(&definition).await?;
        Ok(definition)
    }

    /// List all workflow definitions. Admin only.
    pub async fn list_workflows(
        &self,
        actor: UserId,
    ) -> Result<Vec<WorkflowDefinition>, EngineError> {
        let profile = self.active_profile(actor).await?;
        Authorization::can_manage_workflows(&profile)?;
        Ok(self.workflows.list().await?)
    }

    /// Fetch one workflow definition. Admin only.
    pub async fn get_workflow(
        &self,
        actor: UserId,
        id: WorkflowId,
    ) -> Result<WorkflowDefinition, EngineError> {
        let profile = self.active_profile(actor).await?;
        Authorization::can_manage_workflows(&profile)?;
        self.workflows
            .load(id)
            .await?
            .ok_or(EngineError::WorkflowNotFound(id))
    }

    /// The expense-scoped critical section. At most one transition per
    /// expense id is in flight at a time.
    fn lock_for(&self, id: ExpenseId) -> Arc<Mutex<()>> {
        let entry = self.locks.entry(id).or_default();
        Arc::clone(entry.value())
    }

    /// Resolves the actor to an active profile; unknown or deactivated
    /// users are indistinguishable from unauthorized ones.
    async fn active_profile(&self, id: UserId) -> Result<UserProfile, EngineError> {
        self.directory
            .profile(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(EngineError::Forbidden)
    }

    /// The eligible approver pool for a step.
    ///
    /// Role pools contain every active non-employee holder of the tag.
    /// Managers only qualify when the expense owner reports to them,
    /// matching the scoping that authorization applies.
    async fn approver_pool(
        &self,
        owner: UserId,
        spec: &ApproverSpec,
    ) -> Result<HashSet<UserId>, EngineError> {
        match spec {
            ApproverSpec::User(id) => Ok(HashSet::from([*id])),
            ApproverSpec::Role(tag) => {
                let mut pool = HashSet::new();
                for member in self.directory.members_with_role(tag).await? {
                    if !member.is_active || member.role == Role::Employee {
                        continue;
                    }
                    if member.role == Role::Manager
                        && !self.directory.team_of(member.id).await?.contains(&owner)
                    {
                        continue;
                    }
                    pool.insert(member.id);
                }
                Ok(pool)
            }
        }
    }

    fn transition(expense: &mut Expense, to: ExpenseStatus) -> Result<(), EngineError> {
        if !lifecycle::is_valid_transition(expense.status, to) {
            return Err(ExpenseError::InvalidTransition {
                from: expense.status,
                to,
            }
            .into());
        }
        expense.status = to;
        Ok(())
    }
}
