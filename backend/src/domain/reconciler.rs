//! Set-difference planner for pay-cycle assignments.
//!
//! The planner is pure: callers hand it the desired user ids and the rows
//! they have just fetched from the store, and get back the two batches that
//! bring the store in line with the desired list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{AssignmentId, AssignmentRef, UserId};

/// Minimal insert and delete batches for one (company, pay cycle).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPlan {
    /// Users to assign, in desired order, without duplicates.
    pub to_insert: Vec<UserId>,
    /// Rows to remove, in the order they were fetched.
    pub to_delete: Vec<AssignmentId>,
}

impl AssignmentPlan {
    /// Whether applying the plan would leave the store untouched.
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// Counts reported after a reconcile has been applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub inserted: usize,
    pub deleted: usize,
}

/// Diff `desired` against the freshly fetched `current` rows.
///
/// A desired user that already has several rows keeps the first one; the
/// extras are scheduled for deletion alongside rows of undesired users.
///
/// # Examples
/// ```
/// use backend::domain::{plan_reconciliation, AssignmentId, AssignmentRef, UserId};
///
/// let id = |raw: &str| UserId::new(raw).expect("valid id");
/// let current = vec![
///     AssignmentRef { id: AssignmentId::new("row-a"), user_id: id("A") },
///     AssignmentRef { id: AssignmentId::new("row-b"), user_id: id("B") },
/// ];
/// let plan = plan_reconciliation(&[id("B"), id("C")], &current);
/// assert_eq!(plan.to_insert, vec![id("C")]);
/// assert_eq!(plan.to_delete, vec![AssignmentId::new("row-a")]);
/// ```
pub fn plan_reconciliation(desired: &[UserId], current: &[AssignmentRef]) -> AssignmentPlan {
    let wanted: HashSet<&UserId> = desired.iter().collect();
    let mut kept: HashSet<&UserId> = HashSet::with_capacity(current.len());
    let mut to_delete = Vec::new();

    for row in current {
        if wanted.contains(&row.user_id) && kept.insert(&row.user_id) {
            continue;
        }
        to_delete.push(row.id.clone());
    }

    let mut queued: HashSet<&UserId> = HashSet::with_capacity(desired.len());
    let to_insert = desired
        .iter()
        .filter(|user_id| !kept.contains(user_id) && queued.insert(user_id))
        .cloned()
        .collect();

    AssignmentPlan {
        to_insert,
        to_delete,
    }
}
