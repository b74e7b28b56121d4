//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; each converts into its domain
//! type explicitly and fails on values the domain rejects.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Assignment, AssignmentId, AssignmentRef, Company, CompanyId, PayCycle, User, UserRecord,
};

use super::schema::{companies, pay_cycle_assignments, users};

/// Reason a row could not become a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table} row {id}: {message}")]
pub(crate) struct RowDecodeError {
    pub table: &'static str,
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub manager_id: Option<Uuid>,
    pub company_id: Uuid,
}

impl TryFrom<UserRow> for User {
    type Error = RowDecodeError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let record = UserRecord {
            id: Some(row.id.to_string()),
            name: Some(row.name),
            email: Some(row.email),
            role: Some(row.role),
            department: row.department,
            manager_id: row.manager_id.map(|value| value.to_string()),
            company_id: Some(row.company_id.to_string()),
        };
        Self::try_from(record).map_err(|err| RowDecodeError {
            table: "users",
            id,
            message: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pay_cycle_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub pay_cycle: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = RowDecodeError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let pay_cycle = row
            .pay_cycle
            .parse::<PayCycle>()
            .map_err(|err| RowDecodeError {
                table: "pay_cycle_assignments",
                id: row.id,
                message: err.to_string(),
            })?;
        Ok(Self {
            id: AssignmentId::from(row.id),
            user_id: row.user_id.into(),
            company_id: CompanyId::from(row.company_id),
            pay_cycle,
            created_at: row.created_at,
        })
    }
}

/// `(id, user_id)` projection used when planning a reconcile.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct AssignmentRefRow {
    pub id: Uuid,
    pub user_id: Uuid,
}

impl From<AssignmentRefRow> for AssignmentRef {
    fn from(row: AssignmentRefRow) -> Self {
        Self {
            id: AssignmentId::from(row.id),
            user_id: row.user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pay_cycle_assignments)]
pub(crate) struct NewAssignmentRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub pay_cycle: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: CompanyId::from(row.id),
            name: row.name,
            description: row.description,
            logo: row.logo,
            color: row.color,
            is_active: row.is_active,
        }
    }
}
