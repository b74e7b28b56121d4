//! Port for the users / pay-cycle-assignments store.
//!
//! The store is the only component that knows how rows are persisted. It
//! exposes typed reads and two bulk mutations; reconciliation logic lives in
//! the domain and only ever asks for whole batches.

use async_trait::async_trait;

use crate::domain::{
    Assignment, AssignmentId, AssignmentRef, CompanyId, NewAssignment, PayCycle, User,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by pay-cycle store adapters.
    pub enum PayCycleStoreError {
        /// The store could not be reached.
        Connection { message: String } => "pay-cycle store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "pay-cycle store query failed: {message}",
        /// A row could not be decoded into its domain type.
        Decode { message: String } => "pay-cycle store returned an invalid row: {message}",
    }
}

/// Typed access to company users and their pay-cycle assignment rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayCycleStore: Send + Sync {
    /// Every user of a company, ordered by name ascending.
    async fn list_company_users(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<User>, PayCycleStoreError>;

    /// Current `(row id, user id)` pairs for one pay cycle of a company.
    ///
    /// Duplicate user ids are returned as stored.
    async fn list_assignment_rows(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
    ) -> Result<Vec<AssignmentRef>, PayCycleStoreError>;

    /// Users assigned to one pay cycle of a company.
    async fn list_assigned_users(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
    ) -> Result<Vec<User>, PayCycleStoreError>;

    /// Every assignment row of a company across all pay cycles.
    async fn list_company_assignments(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Assignment>, PayCycleStoreError>;

    /// Insert a batch of assignment rows, returning the number inserted.
    async fn insert_assignments(
        &self,
        rows: &[NewAssignment],
    ) -> Result<usize, PayCycleStoreError>;

    /// Delete assignment rows by id, returning the number deleted.
    async fn delete_assignments(&self, ids: &[AssignmentId]) -> Result<usize, PayCycleStoreError>;
}
