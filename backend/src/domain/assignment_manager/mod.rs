//! Dual-list pay-cycle assignment manager.
//!
//! - [`state`]: the pure reducer over one manager's selections and lists.
//! - [`interaction`]: drag, drop and click gestures expressed as transitions.
//! - [`sync`]: versioned server snapshots and the policy that applies them.
//! - [`session`]: the async controller that loads, saves and listens for
//!   changes.

pub mod interaction;
pub mod session;
pub mod state;
pub mod sync;

pub use interaction::{ClickModifiers, DragPayload, DragPayloadError, USER_IDS_MIME};
pub use session::{ManagerSession, SaveError, SessionTarget, SessionToken};
pub use state::{Action, ManagerState, Pane, UserList};
pub use sync::{
    ServerSnapshot, SnapshotOutcome, SnapshotVersion, SyncPolicy, UnknownSyncPolicy,
};
