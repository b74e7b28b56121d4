//! Async owner of one open pay-cycle manager.
//!
//! The controller runs the initial load, the reconciling save and the
//! realtime bridge. State lives behind a synchronous mutex that is never held
//! across an `.await`; every async result is checked against the
//! [`SessionToken`] it was started under and dropped if the session has since
//! been closed or reopened.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::pay_cycle_service::{DataUnavailable, PayCycleService};
use crate::domain::ports::{ChangeListener, Subscription};
use crate::domain::{
    CompanyId, FallbackRoster, PayCycle, ReconcileOutcome, User, UserId, fallback_roster,
};

use super::interaction::{ClickModifiers, DragPayload};
use super::state::{Action, ManagerState, Pane};
use super::sync::{SnapshotOutcome, SnapshotVersion, SyncPolicy};

/// Identifies one `open` of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Company and pay cycle a session is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub company_id: CompanyId,
    pub pay_cycle: PayCycle,
}

/// Reasons a save did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("a save is already in progress")]
    AlreadySaving,
    #[error("the manager is not open")]
    NotOpen,
    #[error("the manager is still loading")]
    Loading,
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),
}

#[derive(Default)]
struct Inner {
    token: SessionToken,
    target: Option<SessionTarget>,
    state: ManagerState,
    open: bool,
    subscription: Option<Subscription>,
    bridge: Option<JoinHandle<()>>,
}

impl Inner {
    fn is_current(&self, token: SessionToken) -> bool {
        self.open && self.token == token
    }

    fn release_realtime(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(bridge) = self.bridge.take() {
            bridge.abort();
        }
    }

    fn close(&mut self) {
        self.release_realtime();
        self.open = false;
        self.target = None;
        self.state = ManagerState::default();
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the saving flag when dropped, including on early return.
struct SavingGuard<'a>(&'a AtomicBool);

impl<'a> SavingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One pay-cycle manager instance.
pub struct ManagerSession {
    service: PayCycleService,
    policy: SyncPolicy,
    inner: Arc<Mutex<Inner>>,
    saving: AtomicBool,
}

impl ManagerSession {
    pub fn new(service: PayCycleService, policy: SyncPolicy) -> Self {
        Self {
            service,
            policy,
            inner: Arc::new(Mutex::new(Inner::default())),
            saving: AtomicBool::new(false),
        }
    }

    /// Open the manager for `company_id` / `pay_cycle` and load both lists.
    ///
    /// Any previous target is released first. The change subscription is
    /// registered before the reads start, so a change committed while the
    /// load is in flight still triggers a refresh once the lists are in.
    /// A failed fetch is replaced by its part of the sample roster and only
    /// logged; the other fetch keeps its real result.
    pub async fn open(&self, company_id: CompanyId, pay_cycle: PayCycle) -> SessionToken {
        let token = {
            let mut inner = lock(&self.inner);
            inner.release_realtime();
            inner.token = inner.token.next();
            inner.target = Some(SessionTarget {
                company_id: company_id.clone(),
                pay_cycle,
            });
            inner.state = ManagerState::loading();
            inner.open = true;
            inner.token
        };

        let notifications = self.subscribe(token, &company_id).await;

        let (roster, assigned) = tokio::join!(
            self.service.list_company_users(&company_id),
            self.service.list_assigned_users(&company_id, pay_cycle),
        );
        let roster = roster.unwrap_or_else(|err| {
            warn!(
                company_id = %company_id,
                pay_cycle = %pay_cycle,
                error = %err,
                "company users unavailable; showing sample roster"
            );
            sample_roster().roster
        });
        let assigned = assigned.unwrap_or_else(|err| {
            warn!(
                company_id = %company_id,
                pay_cycle = %pay_cycle,
                error = %err,
                "assigned users unavailable; showing sample assignments"
            );
            sample_roster().assigned
        });

        let mut inner = lock(&self.inner);
        if !inner.is_current(token) {
            debug!(company_id = %company_id, "discarding load for superseded session");
            return token;
        }
        let state = mem::take(&mut inner.state);
        inner.state = state.apply(Action::Loaded { roster, assigned });
        if let Some(notifications) = notifications {
            let bridge = Bridge {
                service: self.service.clone(),
                inner: Arc::clone(&self.inner),
                token,
                company_id,
                pay_cycle,
                policy: self.policy,
            };
            inner.bridge = Some(tokio::spawn(bridge.run(notifications)));
        }
        token
    }

    /// Register a change listener for `token`, queueing notifications until
    /// the bridge starts.
    async fn subscribe(
        &self,
        token: SessionToken,
        company_id: &CompanyId,
    ) -> Option<mpsc::UnboundedReceiver<()>> {
        let (tx, rx) = mpsc::unbounded_channel::<()>();
        let listener: ChangeListener = Arc::new(move || {
            tx.send(()).ok();
        });

        let subscription = match self
            .service
            .subscribe_to_assignment_changes(company_id, listener)
            .await
        {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!(
                    company_id = %company_id,
                    error = %err,
                    "realtime updates unavailable for this session"
                );
                return None;
            }
        };

        let mut inner = lock(&self.inner);
        if inner.is_current(token) {
            inner.subscription = Some(subscription);
            Some(rx)
        } else {
            subscription.unsubscribe();
            None
        }
    }

    /// Apply a reducer action to the open session.
    pub fn dispatch(&self, action: Action) {
        self.update(|state| state.apply(action));
    }

    fn update(&self, transition: impl FnOnce(ManagerState) -> ManagerState) {
        let mut inner = lock(&self.inner);
        if !inner.open {
            return;
        }
        let state = mem::take(&mut inner.state);
        inner.state = transition(state);
    }

    /// Copy of the current state.
    pub fn state(&self) -> ManagerState {
        lock(&self.inner).state.clone()
    }

    pub fn begin_drag(&self, pane: Pane, id: &UserId) -> DragPayload {
        lock(&self.inner).state.begin_drag(pane, id)
    }

    pub fn drag_enter(&self, pane: Pane) {
        self.update(|state| state.drag_enter(pane));
    }

    pub fn drag_leave(&self, pane: Pane) {
        self.update(|state| state.drag_leave(pane));
    }

    pub fn drop_payload(&self, target: Pane, payload: Option<&DragPayload>) {
        self.update(|state| state.drop_payload(target, payload));
    }

    /// Drop a raw transfer string dragged out of `origin` onto `target`.
    ///
    /// Undecodable payloads only clear the hover flag.
    pub fn drop_transfer(&self, target: Pane, origin: Pane, raw: &str) {
        let payload = DragPayload::decode(origin, raw)
            .map_err(|err| debug!(error = %err, "ignoring drag payload"))
            .ok();
        self.drop_payload(target, payload.as_ref());
    }

    pub fn click(&self, pane: Pane, id: UserId, modifiers: ClickModifiers) {
        self.update(|state| state.click(pane, id, modifiers));
    }

    /// Accept or discard a snapshot parked by [`SyncPolicy::PromptUser`].
    pub fn resolve_conflict(&self, accept: bool) {
        self.update(|state| state.resolve_conflict(accept));
    }

    /// Reconcile the store with the assigned pane and close on success.
    ///
    /// # Errors
    /// [`SaveError::AlreadySaving`] while another save runs; the data error
    /// when the store rejects any step, in which case the session stays open.
    pub async fn save(&self) -> Result<ReconcileOutcome, SaveError> {
        let _guard = SavingGuard::acquire(&self.saving).ok_or(SaveError::AlreadySaving)?;

        let (token, target, desired) = {
            let inner = lock(&self.inner);
            let target = match (&inner.target, inner.open) {
                (Some(target), true) => target.clone(),
                _ => return Err(SaveError::NotOpen),
            };
            if inner.state.is_loading() {
                return Err(SaveError::Loading);
            }
            (inner.token, target, inner.state.assigned_ids())
        };

        let outcome = self
            .service
            .reconcile_assignments(&target.company_id, target.pay_cycle, &desired)
            .await?;

        let mut inner = lock(&self.inner);
        if inner.is_current(token) {
            inner.close();
        }
        Ok(outcome)
    }

    /// Release the subscription, stop the bridge and discard the state.
    pub fn close(&self) {
        lock(&self.inner).close();
    }

    pub fn is_open(&self) -> bool {
        lock(&self.inner).open
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    pub fn target(&self) -> Option<SessionTarget> {
        lock(&self.inner).target.clone()
    }

    /// Token of the most recent `open`.
    pub fn token(&self) -> SessionToken {
        lock(&self.inner).token
    }

    /// Whether the session currently holds a realtime subscription.
    pub fn is_subscribed(&self) -> bool {
        lock(&self.inner).subscription.is_some()
    }
}

impl Drop for ManagerSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn sample_roster() -> FallbackRoster {
    fallback_roster().unwrap_or_else(|err| {
        error!(error = %err, "sample roster failed validation");
        FallbackRoster {
            roster: Vec::new(),
            assigned: Vec::new(),
        }
    })
}

/// Background task turning change notifications into snapshots.
struct Bridge {
    service: PayCycleService,
    inner: Arc<Mutex<Inner>>,
    token: SessionToken,
    company_id: CompanyId,
    pay_cycle: PayCycle,
    policy: SyncPolicy,
}

impl Bridge {
    async fn run(self, mut notifications: mpsc::UnboundedReceiver<()>) {
        let mut version = SnapshotVersion::default();
        while notifications.recv().await.is_some() {
            // Collapse a burst of notifications into one re-fetch.
            while notifications.try_recv().is_ok() {}
            version = version.next();

            match self
                .service
                .list_assigned_users(&self.company_id, self.pay_cycle)
                .await
            {
                Ok(users) => {
                    if !self.apply(version, users) {
                        return;
                    }
                }
                Err(err) => warn!(
                    company_id = %self.company_id,
                    pay_cycle = %self.pay_cycle,
                    error = %err,
                    "realtime refresh failed"
                ),
            }
        }
    }

    fn apply(&self, version: SnapshotVersion, users: Vec<User>) -> bool {
        let mut inner = lock(&self.inner);
        if !inner.is_current(self.token) {
            return false;
        }
        let state = mem::take(&mut inner.state);
        let (state, outcome) = state.apply_server_snapshot(version, users, self.policy);
        inner.state = state;
        if outcome != SnapshotOutcome::Stale {
            debug!(
                company_id = %self.company_id,
                pay_cycle = %self.pay_cycle,
                version = version.get(),
                outcome = ?outcome,
                "applied realtime snapshot"
            );
        }
        true
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
