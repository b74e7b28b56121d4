//! Versioned server snapshots and the policy deciding how they meet local
//! edits.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{User, UserId};

use super::state::{ManagerState, UserList};

/// How a server snapshot is combined with unsaved local moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// Replace the assigned set wholesale, discarding local moves.
    #[default]
    Overwrite,
    /// Keep local additions and removals on top of the new server set.
    Merge,
    /// Park the snapshot until the user accepts or rejects it.
    PromptUser,
}

impl SyncPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
            Self::PromptUser => "prompt-user",
        }
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sync policy `{0}` (expected overwrite, merge or prompt-user)")]
pub struct UnknownSyncPolicy(pub String);

impl FromStr for SyncPolicy {
    type Err = UnknownSyncPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "merge" => Ok(Self::Merge),
            "prompt-user" | "prompt" => Ok(Self::PromptUser),
            _ => Err(UnknownSyncPolicy(value.to_owned())),
        }
    }
}

/// Monotonic per-session snapshot counter. Zero is the initial load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotVersion(u64);

impl SnapshotVersion {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Assigned users as reported by the server at some version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSnapshot {
    pub version: SnapshotVersion,
    pub users: Vec<User>,
}

/// What happened to a snapshot handed to [`ManagerState::apply_server_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The assigned set now reflects the snapshot.
    Applied,
    /// The snapshot was older than one already seen.
    Stale,
    /// The snapshot is waiting for [`ManagerState::resolve_conflict`].
    Deferred,
}

impl ManagerState {
    /// Fold a server snapshot into the state under `policy`.
    ///
    /// Snapshots at or below the current version are ignored.
    pub fn apply_server_snapshot(
        self,
        version: SnapshotVersion,
        users: Vec<User>,
        policy: SyncPolicy,
    ) -> (Self, SnapshotOutcome) {
        if version <= self.version {
            return (self, SnapshotOutcome::Stale);
        }
        let snapshot = ServerSnapshot { version, users };
        match policy {
            SyncPolicy::Overwrite => (self.overwrite_with(snapshot), SnapshotOutcome::Applied),
            SyncPolicy::Merge => (self.merge_with(snapshot), SnapshotOutcome::Applied),
            SyncPolicy::PromptUser => {
                let mut state = self;
                state.version = snapshot.version;
                state.pending_conflict = Some(snapshot);
                (state, SnapshotOutcome::Deferred)
            }
        }
    }

    /// Accept (overwrite) or discard the parked snapshot.
    #[must_use]
    pub fn resolve_conflict(mut self, accept: bool) -> Self {
        match self.pending_conflict.take() {
            Some(snapshot) if accept => self.overwrite_with(snapshot),
            _ => self,
        }
    }

    /// Whether the assigned set differs from the last server baseline.
    pub fn has_local_changes(&self) -> bool {
        self.assigned.len() != self.baseline.len()
            || self.baseline.iter().any(|id| !self.assigned.contains(id))
    }

    fn overwrite_with(mut self, snapshot: ServerSnapshot) -> Self {
        self.assigned = snapshot.users.into_iter().collect();
        self.finish_snapshot(snapshot.version)
    }

    fn merge_with(mut self, snapshot: ServerSnapshot) -> Self {
        let ServerSnapshot { version, users } = snapshot;
        let server: UserList = users.into_iter().collect();
        let server_ids = server.ids();

        let merged = {
            let baseline: HashSet<&UserId> = self.baseline.iter().collect();
            let removed: HashSet<&UserId> = baseline
                .iter()
                .copied()
                .filter(|id| !self.assigned.contains(id))
                .collect();
            let mut merged: UserList = server
                .iter()
                .filter(|user| !removed.contains(user.id()))
                .cloned()
                .collect();
            for user in self.assigned.iter().filter(|user| !baseline.contains(user.id())) {
                merged.push(user.clone());
            }
            merged
        };

        self.assigned = merged;
        let mut state = self.finish_snapshot(version);
        state.baseline = server_ids;
        state
    }

    fn finish_snapshot(mut self, version: SnapshotVersion) -> Self {
        let assigned = &self.assigned;
        self.right_selection.retain(|id| assigned.contains(id));
        self.left_selection.retain(|id| !assigned.contains(id));
        self.baseline = self.assigned.ids();
        self.version = version;
        self.pending_conflict = None;
        self
    }
}
