//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed entities of the pay-cycle manager and
//! the operations over them, independent of HTTP, WebSocket or database
//! concerns.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic error payload.
//! - `User`, `Company`, `PayCycle`, `Assignment`: the data model.
//! - `plan_reconciliation`: the pure insert/delete planner.
//! - `PayCycleService`: data access over the outbound ports.
//! - `assignment_manager`: reducer, gestures, sync policy and session.

pub mod assignment;
pub mod assignment_manager;
pub mod company;
pub mod error;
pub mod fallback;
pub mod pay_cycle;
pub mod pay_cycle_service;
pub mod ports;
pub mod reconciler;
pub mod user;

pub use self::assignment::{Assignment, AssignmentId, AssignmentRef, NewAssignment};
pub use self::company::{Company, CompanyId};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::fallback::{FALLBACK_ASSIGNED_COUNT, FallbackRoster, fallback_roster};
pub use self::pay_cycle::{PayCycle, UnknownPayCycle};
pub use self::pay_cycle_service::{DataOperation, DataUnavailable, PayCycleService};
pub use self::reconciler::{AssignmentPlan, ReconcileOutcome, plan_reconciliation};
pub use self::user::{User, UserId, UserRecord, UserRole, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("no such company"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
