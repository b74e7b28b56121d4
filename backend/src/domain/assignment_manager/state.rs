//! Dual-list selection state and its reducer.
//!
//! The unassigned pane is never stored: it is derived from the roster minus
//! the assigned set, so the two panes partition the roster after every
//! transition.

use std::collections::HashSet;

use crate::domain::{User, UserId};

use super::sync::{ServerSnapshot, SnapshotVersion};

/// One side of the dual list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Left pane: roster users not in the pay cycle.
    Unassigned,
    /// Right pane: users assigned to the pay cycle.
    Assigned,
}

impl Pane {
    /// The pane on the other side.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Unassigned => Self::Assigned,
            Self::Assigned => Self::Unassigned,
        }
    }
}

/// Insertion-ordered user collection keyed by id; the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserList {
    users: Vec<User>,
    ids: HashSet<UserId>,
}

impl UserList {
    /// Whether `id` is present.
    pub fn contains(&self, id: &UserId) -> bool {
        self.ids.contains(id)
    }

    /// Append `user` unless its id is already present.
    pub fn push(&mut self, user: User) -> bool {
        if !self.ids.insert(user.id().clone()) {
            return false;
        }
        self.users.push(user);
        true
    }

    /// Drop every user whose id is in `ids`.
    pub fn remove_all(&mut self, ids: &HashSet<UserId>) {
        self.users.retain(|user| !ids.contains(user.id()));
        self.ids.retain(|id| !ids.contains(id));
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Ids in list order.
    pub fn ids(&self) -> Vec<UserId> {
        self.users.iter().map(|user| user.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<User> for UserList {
    fn from_iter<T: IntoIterator<Item = User>>(iter: T) -> Self {
        let mut list = Self::default();
        for user in iter {
            list.push(user);
        }
        list
    }
}

/// Reducer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Move pool users into the assigned set.
    MoveToAssigned(Vec<UserId>),
    /// Move assigned users back to the pool.
    MoveToUnassigned(Vec<UserId>),
    /// Select `id` alone, or toggle it when `multi` is set.
    ToggleSelect { pane: Pane, id: UserId, multi: bool },
    /// Change the pane's filter string.
    SetSearch { pane: Pane, query: String },
    /// Replace roster and assigned set after a load.
    Loaded { roster: Vec<User>, assigned: Vec<User> },
    /// Empty the pane's selection.
    ClearSelection(Pane),
}

/// Ephemeral state of one open manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerState {
    pub(super) roster: UserList,
    pub(super) assigned: UserList,
    pub(super) left_selection: HashSet<UserId>,
    pub(super) right_selection: HashSet<UserId>,
    pub(super) search_left: String,
    pub(super) search_right: String,
    pub(super) drag_over_left: bool,
    pub(super) drag_over_right: bool,
    pub(super) loading: bool,
    pub(super) baseline: Vec<UserId>,
    pub(super) version: SnapshotVersion,
    pub(super) pending_conflict: Option<ServerSnapshot>,
}

impl ManagerState {
    /// State of a freshly opened manager awaiting its first load.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Apply one action, returning the next state.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::assignment_manager::{Action, ManagerState, Pane};
    /// use backend::domain::{User, UserId, UserRole};
    ///
    /// let id = UserId::new("1").expect("valid id");
    /// let ada = User::try_new(id.clone(), "Ada Lovelace", "ada@example.com", UserRole::Employee)
    ///     .expect("valid user");
    /// let loaded = ManagerState::loading().apply(Action::Loaded {
    ///     roster: vec![ada],
    ///     assigned: Vec::new(),
    /// });
    /// let state = loaded.apply(Action::ToggleSelect {
    ///     pane: Pane::Unassigned,
    ///     id: id.clone(),
    ///     multi: false,
    /// });
    /// assert!(state.selection(Pane::Unassigned).contains(&id));
    /// ```
    #[must_use]
    pub fn apply(mut self, action: Action) -> Self {
        match action {
            Action::MoveToAssigned(ids) => {
                let requested: HashSet<UserId> = ids.into_iter().collect();
                let moving: Vec<User> = self
                    .unassigned_pool()
                    .filter(|user| requested.contains(user.id()))
                    .cloned()
                    .collect();
                for user in moving {
                    self.assigned.push(user);
                }
                self.left_selection.clear();
            }
            Action::MoveToUnassigned(ids) => {
                let requested: HashSet<UserId> = ids.into_iter().collect();
                self.assigned.remove_all(&requested);
                self.right_selection.clear();
            }
            Action::ToggleSelect { pane, id, multi } => {
                if !self.is_member(pane, &id) {
                    return self;
                }
                let selection = self.selection_mut(pane);
                if !multi {
                    selection.clear();
                    selection.insert(id);
                } else if !selection.remove(&id) {
                    selection.insert(id);
                }
            }
            Action::SetSearch { pane, query } => match pane {
                Pane::Unassigned => self.search_left = query,
                Pane::Assigned => self.search_right = query,
            },
            Action::Loaded { roster, assigned } => {
                self.roster = roster.into_iter().collect();
                self.assigned = assigned.into_iter().collect();
                self.baseline = self.assigned.ids();
                self.left_selection.clear();
                self.right_selection.clear();
                self.pending_conflict = None;
                self.loading = false;
            }
            Action::ClearSelection(pane) => self.selection_mut(pane).clear(),
        }
        self
    }

    fn is_member(&self, pane: Pane, id: &UserId) -> bool {
        match pane {
            Pane::Unassigned => self.roster.contains(id) && !self.assigned.contains(id),
            Pane::Assigned => self.assigned.contains(id),
        }
    }

    fn selection_mut(&mut self, pane: Pane) -> &mut HashSet<UserId> {
        match pane {
            Pane::Unassigned => &mut self.left_selection,
            Pane::Assigned => &mut self.right_selection,
        }
    }

    /// Roster users not in the assigned set, in roster order.
    pub fn unassigned_pool(&self) -> impl Iterator<Item = &User> {
        self.roster
            .iter()
            .filter(|user| !self.assigned.contains(user.id()))
    }

    /// Users in `pane`, unfiltered, in display order.
    pub fn members(&self, pane: Pane) -> Vec<&User> {
        match pane {
            Pane::Unassigned => self.unassigned_pool().collect(),
            Pane::Assigned => self.assigned.iter().collect(),
        }
    }

    /// Users in `pane` matching its search string.
    pub fn visible(&self, pane: Pane) -> Vec<&User> {
        let needle = self.search(pane).trim().to_lowercase();
        self.members(pane)
            .into_iter()
            .filter(|user| user.matches_search(&needle))
            .collect()
    }

    pub fn roster(&self) -> &UserList {
        &self.roster
    }

    pub fn assigned(&self) -> &UserList {
        &self.assigned
    }

    /// Assigned ids in display order; the desired list handed to a save.
    pub fn assigned_ids(&self) -> Vec<UserId> {
        self.assigned.ids()
    }

    pub fn selection(&self, pane: Pane) -> &HashSet<UserId> {
        match pane {
            Pane::Unassigned => &self.left_selection,
            Pane::Assigned => &self.right_selection,
        }
    }

    pub fn search(&self, pane: Pane) -> &str {
        match pane {
            Pane::Unassigned => &self.search_left,
            Pane::Assigned => &self.search_right,
        }
    }

    /// Whether a drag is hovering over `pane`.
    pub fn is_drag_over(&self, pane: Pane) -> bool {
        match pane {
            Pane::Unassigned => self.drag_over_left,
            Pane::Assigned => self.drag_over_right,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last applied server snapshot version.
    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    /// Snapshot parked by the prompt-user policy, if any.
    pub fn pending_conflict(&self) -> Option<&ServerSnapshot> {
        self.pending_conflict.as_ref()
    }
}
