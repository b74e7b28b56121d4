//! Process-local `PayCycleStore` and `CompanyDirectory`.
//!
//! Used when no database is configured, by the example-data seeding path and
//! by behaviour tests. Rows live behind a mutex; availability can be toggled
//! to exercise fallback and failure paths.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::{
    CompanyDirectory, CompanyDirectoryError, PayCycleStore, PayCycleStoreError,
};
use crate::domain::{
    Assignment, AssignmentId, AssignmentRef, Company, CompanyId, NewAssignment, PayCycle, User,
    UserId,
};
use crate::outbound::realtime::ChangeBroadcaster;

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    users: Vec<User>,
    assignments: Vec<Assignment>,
}

impl Tables {
    fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id() == id)
    }

    fn rows_for<'a>(
        &'a self,
        company_id: &'a CompanyId,
        pay_cycle: PayCycle,
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments
            .iter()
            .filter(move |row| &row.company_id == company_id && row.pay_cycle == pay_cycle)
    }
}

/// In-memory pay-cycle store with optional change publishing.
#[derive(Clone, Default)]
pub struct InMemoryPayCycleStore {
    tables: Arc<Mutex<Tables>>,
    broadcaster: Option<ChangeBroadcaster>,
    offline: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryPayCycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a change notification after each successful mutation.
    pub fn with_broadcaster(mut self, broadcaster: ChangeBroadcaster) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    /// Make every operation fail with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make inserts and deletes fail with a query error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn add_company(&self, company: Company) {
        self.lock().companies.push(company);
    }

    pub fn add_user(&self, user: User) {
        self.lock().users.push(user);
    }

    /// Seed an assignment row without publishing a notification.
    pub fn assign(
        &self,
        user_id: UserId,
        company_id: CompanyId,
        pay_cycle: PayCycle,
    ) -> AssignmentId {
        let row = new_row(NewAssignment {
            user_id,
            company_id,
            pay_cycle,
        });
        let id = row.id.clone();
        self.lock().assignments.push(row);
        id
    }

    /// Snapshot of the stored rows for (`company_id`, `pay_cycle`).
    pub fn assignments(&self, company_id: &CompanyId, pay_cycle: PayCycle) -> Vec<Assignment> {
        self.lock()
            .rows_for(company_id, pay_cycle)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_online(&self) -> Result<(), PayCycleStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PayCycleStoreError::connection("in-memory store is offline"));
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<(), PayCycleStoreError> {
        self.ensure_online()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PayCycleStoreError::query("in-memory store rejected the write"));
        }
        Ok(())
    }

    fn notify(&self, mut companies: Vec<CompanyId>) {
        let Some(broadcaster) = &self.broadcaster else {
            return;
        };
        companies.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        companies.dedup();
        for company in &companies {
            broadcaster.publish(company);
        }
    }
}

fn new_row(row: NewAssignment) -> Assignment {
    Assignment {
        id: AssignmentId::from(Uuid::new_v4()),
        user_id: row.user_id,
        company_id: row.company_id,
        pay_cycle: row.pay_cycle,
        created_at: Some(Utc::now()),
    }
}

#[async_trait]
impl PayCycleStore for InMemoryPayCycleStore {
    async fn list_company_users(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<User>, PayCycleStoreError> {
        self.ensure_online()?;
        let mut users: Vec<User> = self
            .lock()
            .users
            .iter()
            .filter(|user| user.company_id() == Some(company_id))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(users)
    }

    async fn list_assignment_rows(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
    ) -> Result<Vec<AssignmentRef>, PayCycleStoreError> {
        self.ensure_online()?;
        Ok(self
            .lock()
            .rows_for(company_id, pay_cycle)
            .map(AssignmentRef::from)
            .collect())
    }

    async fn list_assigned_users(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
    ) -> Result<Vec<User>, PayCycleStoreError> {
        self.ensure_online()?;
        let tables = self.lock();
        Ok(tables
            .rows_for(company_id, pay_cycle)
            .filter_map(|row| tables.user(&row.user_id).cloned())
            .collect())
    }

    async fn list_company_assignments(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Assignment>, PayCycleStoreError> {
        self.ensure_online()?;
        Ok(self
            .lock()
            .assignments
            .iter()
            .filter(|row| &row.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn insert_assignments(
        &self,
        rows: &[NewAssignment],
    ) -> Result<usize, PayCycleStoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.ensure_writable()?;
        let companies: Vec<CompanyId> = rows.iter().map(|row| row.company_id.clone()).collect();
        self.lock()
            .assignments
            .extend(rows.iter().cloned().map(new_row));
        self.notify(companies);
        Ok(rows.len())
    }

    async fn delete_assignments(&self, ids: &[AssignmentId]) -> Result<usize, PayCycleStoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.ensure_writable()?;
        let targets: HashSet<&AssignmentId> = ids.iter().collect();
        let removed: Vec<CompanyId> = {
            let mut tables = self.lock();
            let (gone, kept): (Vec<Assignment>, Vec<Assignment>) =
                std::mem::take(&mut tables.assignments)
                    .into_iter()
                    .partition(|row| targets.contains(&row.id));
            tables.assignments = kept;
            gone.into_iter().map(|row| row.company_id).collect()
        };
        let deleted = removed.len();
        self.notify(removed);
        Ok(deleted)
    }
}

#[async_trait]
impl CompanyDirectory for InMemoryPayCycleStore {
    async fn list_companies(&self) -> Result<Vec<Company>, CompanyDirectoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CompanyDirectoryError::connection("in-memory store is offline"));
        }
        let mut companies = self.lock().companies.clone();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }
}
