//! PostgreSQL-backed `PayCycleStore` using Diesel.
//!
//! Identifiers are UUID columns. Reads for a company id that is not a UUID
//! return nothing, since no such row can exist; writes with a non-UUID id
//! are rejected as decode errors.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PayCycleStore, PayCycleStoreError};
use crate::domain::{
    Assignment, AssignmentId, AssignmentRef, CompanyId, NewAssignment, PayCycle, User,
};
use crate::outbound::realtime::ChangeBroadcaster;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AssignmentRefRow, AssignmentRow, NewAssignmentRow, RowDecodeError, UserRow};
use super::pool::DbPool;
use super::schema::{pay_cycle_assignments, users};

/// Diesel implementation of [`PayCycleStore`].
#[derive(Clone)]
pub struct DieselPayCycleStore {
    pool: DbPool,
    broadcaster: Option<ChangeBroadcaster>,
}

impl DieselPayCycleStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            broadcaster: None,
        }
    }

    /// Publish a change notification after each successful mutation.
    pub fn with_broadcaster(mut self, broadcaster: ChangeBroadcaster) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    fn notify(&self, companies: impl IntoIterator<Item = Uuid>) {
        if let Some(broadcaster) = &self.broadcaster {
            let distinct: BTreeSet<Uuid> = companies.into_iter().collect();
            for company in distinct {
                broadcaster.publish(&CompanyId::from(company));
            }
        }
    }
}

fn pool_error(error: super::pool::PoolError) -> PayCycleStoreError {
    map_pool_error(error, PayCycleStoreError::connection)
}

fn diesel_error(error: diesel::result::Error) -> PayCycleStoreError {
    map_diesel_error(error, PayCycleStoreError::query, PayCycleStoreError::connection)
}

fn decode_error(error: RowDecodeError) -> PayCycleStoreError {
    PayCycleStoreError::decode(error.to_string())
}

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, PayCycleStoreError> {
    Uuid::parse_str(raw).map_err(|err| PayCycleStoreError::decode(format!("{field} `{raw}`: {err}")))
}

fn decode_users(rows: Vec<UserRow>) -> Result<Vec<User>, PayCycleStoreError> {
    rows.into_iter()
        .map(|row| User::try_from(row).map_err(decode_error))
        .collect()
}

#[async_trait]
impl PayCycleStore for DieselPayCycleStore {
    async fn list_company_users(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<User>, PayCycleStoreError> {
        let Ok(company) = Uuid::parse_str(company_id.as_ref()) else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::company_id.eq(company))
            .order((users::name.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        decode_users(rows)
    }

    async fn list_assignment_rows(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
    ) -> Result<Vec<AssignmentRef>, PayCycleStoreError> {
        let Ok(company) = Uuid::parse_str(company_id.as_ref()) else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<AssignmentRefRow> = pay_cycle_assignments::table
            .filter(pay_cycle_assignments::company_id.eq(company))
            .filter(pay_cycle_assignments::pay_cycle.eq(pay_cycle.as_str()))
            .order(pay_cycle_assignments::created_at.asc())
            .select((pay_cycle_assignments::id, pay_cycle_assignments::user_id))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(AssignmentRef::from).collect())
    }

    async fn list_assigned_users(
        &self,
        company_id: &CompanyId,
        pay_cycle: PayCycle,
    ) -> Result<Vec<User>, PayCycleStoreError> {
        let Ok(company) = Uuid::parse_str(company_id.as_ref()) else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = pay_cycle_assignments::table
            .inner_join(users::table)
            .filter(pay_cycle_assignments::company_id.eq(company))
            .filter(pay_cycle_assignments::pay_cycle.eq(pay_cycle.as_str()))
            .order((pay_cycle_assignments::created_at.asc(), users::name.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        decode_users(rows)
    }

    async fn list_company_assignments(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Assignment>, PayCycleStoreError> {
        let Ok(company) = Uuid::parse_str(company_id.as_ref()) else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<AssignmentRow> = pay_cycle_assignments::table
            .filter(pay_cycle_assignments::company_id.eq(company))
            .order((
                pay_cycle_assignments::pay_cycle.asc(),
                pay_cycle_assignments::created_at.asc(),
            ))
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| Assignment::try_from(row).map_err(decode_error))
            .collect()
    }

    async fn insert_assignments(
        &self,
        rows: &[NewAssignment],
    ) -> Result<usize, PayCycleStoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let values = rows
            .iter()
            .map(|row| {
                Ok(NewAssignmentRow {
                    id: Uuid::new_v4(),
                    user_id: parse_uuid(row.user_id.as_ref(), "user id")?,
                    company_id: parse_uuid(row.company_id.as_ref(), "company id")?,
                    pay_cycle: row.pay_cycle.as_str(),
                })
            })
            .collect::<Result<Vec<_>, PayCycleStoreError>>()?;
        let companies: Vec<Uuid> = values.iter().map(|row| row.company_id).collect();

        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let inserted = diesel::insert_into(pay_cycle_assignments::table)
            .values(&values)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        self.notify(companies);
        Ok(inserted)
    }

    async fn delete_assignments(&self, ids: &[AssignmentId]) -> Result<usize, PayCycleStoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let keys = ids
            .iter()
            .map(|id| parse_uuid(id.as_ref(), "assignment id"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let companies: Vec<Uuid> = diesel::delete(
            pay_cycle_assignments::table.filter(pay_cycle_assignments::id.eq_any(keys)),
        )
        .returning(pay_cycle_assignments::company_id)
        .get_results(&mut conn)
        .await
        .map_err(diesel_error)?;
        let deleted = companies.len();
        self.notify(companies);
        Ok(deleted)
    }
}
