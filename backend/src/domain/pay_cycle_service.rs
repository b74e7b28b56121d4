//! Data access operations for the pay-cycle manager.
//!
//! The service wraps the outbound ports and collapses every adapter failure
//! into [`DataUnavailable`], the single error the manager and the inbound
//! adapters need to reason about.

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AssignmentChangeFeed, ChangeFeedError, ChangeListener, CompanyDirectory,
    CompanyDirectoryError, FixtureCompanyDirectory, PayCycleStore, PayCycleStoreError,
    Subscription,
};
use crate::domain::{
    Assignment, Company, CompanyId, Error, NewAssignment, PayCycle, ReconcileOutcome, User, UserId,
    plan_reconciliation,
};

/// Data access operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataOperation {
    ListCompanies,
    ListCompanyUsers,
    ListAssignedUsers,
    ListCompanyAssignments,
    ReconcileAssignments,
    SubscribeAssignmentChanges,
}

impl DataOperation {
    /// Stable snake-case label used in logs and error details.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ListCompanies => "list_companies",
            Self::ListCompanyUsers => "list_company_users",
            Self::ListAssignedUsers => "list_assigned_users",
            Self::ListCompanyAssignments => "list_company_assignments",
            Self::ReconcileAssignments => "reconcile_assignments",
            Self::SubscribeAssignmentChanges => "subscribe_to_assignment_changes",
        }
    }
}

impl fmt::Display for DataOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The backing store could not serve a data access operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct DataUnavailable {
    pub operation: DataOperation,
    pub message: String,
}

impl DataUnavailable {
    fn from_store(operation: DataOperation, error: &PayCycleStoreError) -> Self {
        Self {
            operation,
            message: error.to_string(),
        }
    }
}

impl From<DataUnavailable> for Error {
    fn from(value: DataUnavailable) -> Self {
        Self::service_unavailable(value.to_string())
            .with_details(json!({ "operation": value.operation.as_str() }))
    }
}

/// Typed query, mutate and subscribe operations over the pay-cycle schema.
#[derive(Clone)]
pub struct PayCycleService {
    store: Arc<dyn PayCycleStore>,
    feed: Arc<dyn AssignmentChangeFeed>,
    directory: Arc<dyn CompanyDirectory>,
}

impl PayCycleService {
    /// Create a service over the given store and change feed.
    ///
    /// The company directory defaults to an empty fixture; see
    /// [`Self::with_directory`].
    pub fn new(store: Arc<dyn PayCycleStore>, feed: Arc<dyn AssignmentChangeFeed>) -> Self {
        Self {
            store,
            feed,
            directory: Arc::new(FixtureCompanyDirectory),
        }
    }

    /// Replace the company directory.
    pub fn with_directory(mut self, directory: Arc<dyn CompanyDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// All companies ordered by name.
    pub async fn list_companies(&self) -> Result<Vec<Company>, DataUnavailable> {
        self.directory
            .list_companies()
            .await
            .map_err(|err: CompanyDirectoryError| DataUnavailable {
                operation: DataOperation::ListCompanies,
                message: err.to_string(),
            })
    }

    /// Every user of `company_id`, ordered by name ascending.
    pub async fn list_company_users(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<User>, DataUnavailable> {
        self.store
            .list_company_users(company_id)
            .await
            .map_err(|err| DataUnavailable::from_store(DataOperation::ListCompanyUsers, &err))
    }

    /// Users assigned to `pay_cycle` within `company_id`.
    pub async fn list_assigned_users(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
    ) -> Result<Vec<User>, DataUnavailable> {
        self.store
            .list_assigned_users(company_id, pay_cycle)
            .await
            .map_err(|err| DataUnavailable::from_store(DataOperation::ListAssignedUsers, &err))
    }

    /// Every assignment row of `company_id` across all pay cycles.
    pub async fn list_company_assignments(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Assignment>, DataUnavailable> {
        self.store
            .list_company_assignments(company_id)
            .await
            .map_err(|err| {
                DataUnavailable::from_store(DataOperation::ListCompanyAssignments, &err)
            })
    }

    /// Make the stored assignments of (`company_id`, `pay_cycle`) equal to
    /// `desired`.
    ///
    /// Current rows are re-fetched first so the plan reflects the store, not
    /// a possibly stale view held by the caller. Inserts run before deletes;
    /// an empty batch is skipped.
    pub async fn reconcile_assignments(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
        desired: &[UserId],
    ) -> Result<ReconcileOutcome, DataUnavailable> {
        let fail =
            |err: PayCycleStoreError| DataUnavailable::from_store(DataOperation::ReconcileAssignments, &err);

        let current = self
            .store
            .list_assignment_rows(company_id, pay_cycle)
            .await
            .map_err(fail)?;
        let plan = plan_reconciliation(desired, &current);

        if !plan.to_insert.is_empty() {
            let rows: Vec<NewAssignment> = plan
                .to_insert
                .iter()
                .map(|user_id| NewAssignment {
                    user_id: user_id.clone(),
                    company_id: company_id.clone(),
                    pay_cycle,
                })
                .collect();
            self.store.insert_assignments(&rows).await.map_err(fail)?;
        }

        if !plan.to_delete.is_empty() {
            self.store
                .delete_assignments(&plan.to_delete)
                .await
                .map_err(fail)?;
        }

        let outcome = ReconcileOutcome {
            inserted: plan.to_insert.len(),
            deleted: plan.to_delete.len(),
        };
        info!(
            company_id = %company_id,
            pay_cycle = %pay_cycle,
            inserted = outcome.inserted,
            deleted = outcome.deleted,
            "reconciled pay-cycle assignments"
        );
        Ok(outcome)
    }

    /// Register `on_change` for assignment changes touching `company_id`.
    pub async fn subscribe_to_assignment_changes(
        &self,
        company_id: &CompanyId,
        on_change: ChangeListener,
    ) -> Result<Subscription, DataUnavailable> {
        let subscription = self
            .feed
            .subscribe(company_id, on_change)
            .await
            .map_err(|err: ChangeFeedError| DataUnavailable {
                operation: DataOperation::SubscribeAssignmentChanges,
                message: err.to_string(),
            })?;
        debug!(company_id = %company_id, "subscribed to assignment changes");
        Ok(subscription)
    }
}

#[cfg(test)]
#[path = "pay_cycle_service_tests.rs"]
mod tests;
