//! Pay-cycle assignment rows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CompanyId, PayCycle, UserId};

/// Storage identifier of one assignment row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl From<uuid::Uuid> for AssignmentId {
    fn from(value: uuid::Uuid) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for AssignmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted relation between a user and a company's pay cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub pay_cycle: PayCycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Minimal projection of an assignment row used for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRef {
    pub id: AssignmentId,
    pub user_id: UserId,
}

impl From<&Assignment> for AssignmentRef {
    fn from(value: &Assignment) -> Self {
        Self {
            id: value.id.clone(),
            user_id: value.user_id.clone(),
        }
    }
}

/// Row to insert when a user joins a pay cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub pay_cycle: PayCycle,
}
