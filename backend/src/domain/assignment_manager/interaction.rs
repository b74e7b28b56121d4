//! Drag, drop and click gestures translated into reducer actions.

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

use super::state::{Action, ManagerState, Pane};

/// Transfer format used for dragged user ids.
pub const USER_IDS_MIME: &str = "text/x-user-ids";

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickModifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
}

impl ClickModifiers {
    /// Either modifier extends the selection instead of replacing it.
    pub const fn is_multi(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Ordered ids carried from one pane to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    origin: Pane,
    ids: Vec<UserId>,
}

/// Reasons a transfer string cannot be turned into a payload.
#[derive(Debug, thiserror::Error)]
pub enum DragPayloadError {
    #[error("drag payload is not a JSON array of user ids: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("drag payload carries no user ids")]
    Empty,
}

impl DragPayload {
    pub fn new(origin: Pane, ids: Vec<UserId>) -> Self {
        Self { origin, ids }
    }

    pub fn origin(&self) -> Pane {
        self.origin
    }

    pub fn ids(&self) -> &[UserId] {
        &self.ids
    }

    /// Serialise the ids for the [`USER_IDS_MIME`] transfer slot.
    pub fn encode(&self) -> String {
        serde_json::Value::from(
            self.ids
                .iter()
                .map(|id| id.as_ref().to_owned())
                .collect::<Vec<_>>(),
        )
        .to_string()
    }

    /// Parse a [`USER_IDS_MIME`] transfer string dragged out of `origin`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::assignment_manager::{DragPayload, Pane};
    ///
    /// let payload = DragPayload::decode(Pane::Unassigned, r#"["2","3"]"#).expect("valid");
    /// assert_eq!(payload.ids().len(), 2);
    /// assert!(DragPayload::decode(Pane::Unassigned, "[]").is_err());
    /// ```
    pub fn decode(origin: Pane, raw: &str) -> Result<Self, DragPayloadError> {
        let ids: Vec<UserId> = serde_json::from_str(raw)?;
        if ids.is_empty() {
            return Err(DragPayloadError::Empty);
        }
        Ok(Self { origin, ids })
    }
}

impl ManagerState {
    /// Payload for a drag starting on `id` in `pane`.
    ///
    /// Dragging a selected user carries the whole selection in display
    /// order; dragging an unselected user carries only that user. The
    /// selection itself is left alone.
    pub fn begin_drag(&self, pane: Pane, id: &UserId) -> DragPayload {
        let selection = self.selection(pane);
        let ids = if selection.contains(id) {
            self.members(pane)
                .into_iter()
                .map(|user| user.id())
                .filter(|member| selection.contains(*member))
                .cloned()
                .collect()
        } else {
            vec![id.clone()]
        };
        DragPayload::new(pane, ids)
    }

    #[must_use]
    pub fn drag_enter(self, pane: Pane) -> Self {
        self.with_hover(pane, true)
    }

    #[must_use]
    pub fn drag_leave(self, pane: Pane) -> Self {
        self.with_hover(pane, false)
    }

    fn with_hover(mut self, pane: Pane, hovering: bool) -> Self {
        match pane {
            Pane::Unassigned => self.drag_over_left = hovering,
            Pane::Assigned => self.drag_over_right = hovering,
        }
        self
    }

    /// Finish a drag over `target`.
    ///
    /// The hover flag is cleared; a payload from the other pane moves its
    /// ids into `target`, anything else changes nothing.
    #[must_use]
    pub fn drop_payload(self, target: Pane, payload: Option<&DragPayload>) -> Self {
        let state = self.with_hover(target, false);
        match payload.and_then(|payload| Self::drop_action(target, payload)) {
            Some(action) => state.apply(action),
            None => state,
        }
    }

    fn drop_action(target: Pane, payload: &DragPayload) -> Option<Action> {
        if payload.origin == target || payload.ids.is_empty() {
            return None;
        }
        let ids = payload.ids.clone();
        Some(match target {
            Pane::Assigned => Action::MoveToAssigned(ids),
            Pane::Unassigned => Action::MoveToUnassigned(ids),
        })
    }

    /// Click on `id` in `pane`.
    #[must_use]
    pub fn click(self, pane: Pane, id: UserId, modifiers: ClickModifiers) -> Self {
        self.apply(Action::ToggleSelect {
            pane,
            id,
            multi: modifiers.is_multi(),
        })
    }
}
