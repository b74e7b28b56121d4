//! Tests for the manager session controller.

use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use async_trait::async_trait;
use rstest::{fixture, rstest};
use tokio::sync::Notify;

use super::*;
use crate::domain::ports::{
    AssignmentChangeFeed, ChangeFeedError, FixtureAssignmentChangeFeed, PayCycleStore,
    PayCycleStoreError,
};
use crate::domain::{
    Assignment, AssignmentId, AssignmentRef, NewAssignment, UserRole,
};

fn uid(raw: &str) -> UserId {
    UserId::new(raw).expect("valid id")
}

fn user(id: &str, name: &str) -> User {
    User::try_new(
        uid(id),
        name,
        format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        UserRole::Employee,
    )
    .expect("valid user")
}

/// Single-company store double backed by plain vectors.
#[derive(Default)]
struct StubStore {
    roster: Mutex<Vec<User>>,
    rows: Mutex<Vec<(AssignmentId, User)>>,
    fail_reads: AtomicBool,
    fail_assigned: AtomicBool,
    fail_writes: AtomicBool,
    gate: Option<Arc<Notify>>,
    roster_gate: Mutex<Option<Arc<Notify>>>,
    inserted: Mutex<Vec<NewAssignment>>,
    deleted: Mutex<Vec<AssignmentId>>,
    next_row: AtomicUsize,
}

impl StubStore {
    fn with(roster: Vec<User>, assigned: &[&str]) -> Self {
        let store = Self::default();
        for id in assigned {
            if let Some(found) = roster.iter().find(|u| u.id().as_ref() == *id) {
                store.push_row(found.clone());
            }
        }
        *store.roster.lock().expect("roster lock") = roster;
        store
    }

    fn push_row(&self, user: User) {
        let n = self.next_row.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .expect("rows lock")
            .push((AssignmentId::new(format!("row-{n}")), user));
    }

    fn set_assigned(&self, ids: &[&str]) {
        let roster = self.roster.lock().expect("roster lock").clone();
        self.rows.lock().expect("rows lock").clear();
        for id in ids {
            if let Some(found) = roster.iter().find(|u| u.id().as_ref() == *id) {
                self.push_row(found.clone());
            }
        }
    }

    /// Hold the next `list_company_users` call until `gate` is notified.
    fn hold_next_roster_read(&self, gate: Arc<Notify>) {
        *self.roster_gate.lock().expect("gate lock") = Some(gate);
    }

    fn check_reads(&self) -> Result<(), PayCycleStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PayCycleStoreError::connection("store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl PayCycleStore for StubStore {
    async fn list_company_users(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Vec<User>, PayCycleStoreError> {
        let gate = self.roster_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_reads()?;
        Ok(self.roster.lock().expect("roster lock").clone())
    }

    async fn list_assignment_rows(
        &self,
        _company_id: &CompanyId,
        _pay_cycle: PayCycle,
    ) -> Result<Vec<AssignmentRef>, PayCycleStoreError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.check_reads()?;
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .map(|(id, user)| AssignmentRef {
                id: id.clone(),
                user_id: user.id().clone(),
            })
            .collect())
    }

    async fn list_assigned_users(
        &self,
        _company_id: &CompanyId,
        _pay_cycle: PayCycle,
    ) -> Result<Vec<User>, PayCycleStoreError> {
        self.check_reads()?;
        if self.fail_assigned.load(Ordering::SeqCst) {
            return Err(PayCycleStoreError::query("assignment read timed out"));
        }
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .map(|(_, user)| user.clone())
            .collect())
    }

    async fn list_company_assignments(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Vec<Assignment>, PayCycleStoreError> {
        Ok(Vec::new())
    }

    async fn insert_assignments(
        &self,
        rows: &[NewAssignment],
    ) -> Result<usize, PayCycleStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PayCycleStoreError::query("insert rejected"));
        }
        self.inserted.lock().expect("inserted lock").extend_from_slice(rows);
        Ok(rows.len())
    }

    async fn delete_assignments(&self, ids: &[AssignmentId]) -> Result<usize, PayCycleStoreError> {
        self.deleted.lock().expect("deleted lock").extend_from_slice(ids);
        Ok(ids.len())
    }
}

/// Feed double that lets tests fire notifications by hand.
#[derive(Default)]
struct ManualFeed {
    listeners: Arc<Mutex<Vec<(usize, ChangeListener)>>>,
    next_id: AtomicUsize,
    releases: Arc<AtomicUsize>,
}

impl ManualFeed {
    fn fire(&self) {
        let listeners: Vec<ChangeListener> = self
            .listeners
            .lock()
            .expect("listeners lock")
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn active(&self) -> usize {
        self.listeners.lock().expect("listeners lock").len()
    }
}

#[async_trait]
impl AssignmentChangeFeed for ManualFeed {
    async fn subscribe(
        &self,
        _company_id: &CompanyId,
        listener: ChangeListener,
    ) -> Result<Subscription, ChangeFeedError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .expect("listeners lock")
            .push((id, listener));
        let listeners = Arc::clone(&self.listeners);
        let releases = Arc::clone(&self.releases);
        Ok(Subscription::new(move || {
            releases.fetch_add(1, Ordering::SeqCst);
            listeners
                .lock()
                .expect("listeners lock")
                .retain(|(candidate, _)| *candidate != id);
        }))
    }
}

struct Harness {
    store: Arc<StubStore>,
    feed: Arc<ManualFeed>,
    session: ManagerSession,
}

fn harness_with(store: StubStore, policy: SyncPolicy) -> Harness {
    let store = Arc::new(store);
    let feed = Arc::new(ManualFeed::default());
    let service = PayCycleService::new(store.clone(), feed.clone());
    Harness {
        store,
        feed,
        session: ManagerSession::new(service, policy),
    }
}

#[fixture]
fn roster() -> Vec<User> {
    vec![
        user("a", "Alice Johnson"),
        user("b", "Bob Smith"),
        user("c", "Charlie Davis"),
    ]
}

async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

fn company() -> CompanyId {
    CompanyId::from("C1")
}

#[rstest]
#[tokio::test]
async fn open_loads_both_lists_and_subscribes(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &["a"]), SyncPolicy::Overwrite);

    h.session.open(company(), PayCycle::Weekly).await;

    let state = h.session.state();
    assert!(!state.is_loading());
    assert_eq!(state.assigned_ids(), vec![uid("a")]);
    assert_eq!(state.members(Pane::Unassigned).len(), 2);
    assert!(h.session.is_subscribed());
    assert_eq!(h.feed.active(), 1);
}

#[rstest]
#[tokio::test]
async fn failed_load_shows_sample_roster(roster: Vec<User>) {
    let store = StubStore::with(roster, &["a"]);
    store.fail_reads.store(true, Ordering::SeqCst);
    let h = harness_with(store, SyncPolicy::Overwrite);

    h.session.open(company(), PayCycle::Weekly).await;

    let state = h.session.state();
    assert_eq!(state.roster().len(), 5);
    assert_eq!(state.assigned_ids(), vec![uid("1"), uid("2")]);
    assert!(h.session.is_open());
}

#[rstest]
#[tokio::test]
async fn failed_assigned_fetch_keeps_real_roster(roster: Vec<User>) {
    let store = StubStore::with(roster, &["a"]);
    store.fail_assigned.store(true, Ordering::SeqCst);
    let h = harness_with(store, SyncPolicy::Overwrite);

    h.session.open(company(), PayCycle::Weekly).await;

    let state = h.session.state();
    let names: Vec<&str> = state.roster().iter().map(User::name).collect();
    assert_eq!(names, ["Alice Johnson", "Bob Smith", "Charlie Davis"]);
    assert_eq!(state.assigned_ids(), vec![uid("1"), uid("2")]);
    assert!(!state.is_loading());
}

#[rstest]
#[tokio::test]
async fn change_committed_during_load_is_picked_up(roster: Vec<User>) {
    let gate = Arc::new(Notify::new());
    let store = StubStore::with(roster, &["a"]);
    store.hold_next_roster_read(Arc::clone(&gate));
    let h = harness_with(store, SyncPolicy::Overwrite);

    let (_, listening) = tokio::join!(h.session.open(company(), PayCycle::Weekly), async {
        let listening = eventually(|| h.feed.active() == 1).await;
        h.store.set_assigned(&["a", "b"]);
        h.feed.fire();
        gate.notify_one();
        listening
    });

    assert!(listening, "listener registered before the load finished");
    let session = &h.session;
    assert!(eventually(|| session.state().assigned_ids() == vec![uid("a"), uid("b")]).await);
}

#[rstest]
#[tokio::test]
async fn load_finishing_after_close_is_discarded(roster: Vec<User>) {
    let gate = Arc::new(Notify::new());
    let store = StubStore::with(roster, &["a"]);
    store.hold_next_roster_read(Arc::clone(&gate));
    let h = harness_with(store, SyncPolicy::Overwrite);

    let (token, ()) = tokio::join!(h.session.open(company(), PayCycle::Weekly), async {
        assert!(eventually(|| h.feed.active() == 1).await);
        h.session.close();
        gate.notify_one();
    });

    assert_eq!(token, h.session.token());
    assert!(!h.session.is_open());
    assert!(!h.session.is_subscribed());
    let state = h.session.state();
    assert!(state.roster().is_empty());
    assert!(state.assigned().is_empty());
    assert_eq!(h.feed.active(), 0);
    assert_eq!(h.feed.releases.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn load_finishing_after_reopen_leaves_new_target_alone(roster: Vec<User>) {
    let gate = Arc::new(Notify::new());
    let store = StubStore::with(roster, &["a"]);
    store.hold_next_roster_read(Arc::clone(&gate));
    let h = harness_with(store, SyncPolicy::Overwrite);

    let (first, second) = tokio::join!(h.session.open(company(), PayCycle::Weekly), async {
        assert!(eventually(|| h.feed.active() == 1).await);
        let second = h.session.open(company(), PayCycle::Monthly).await;
        h.session.dispatch(Action::MoveToAssigned(vec![uid("b")]));
        gate.notify_one();
        second
    });

    assert_ne!(first, second);
    assert_eq!(h.session.token(), second);
    assert_eq!(
        h.session.target().map(|target| target.pay_cycle),
        Some(PayCycle::Monthly)
    );
    assert_eq!(h.session.state().assigned_ids(), vec![uid("a"), uid("b")]);
    assert!(h.session.is_subscribed());
    assert_eq!(h.feed.active(), 1);
    assert_eq!(h.feed.releases.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn subscription_failure_leaves_session_usable(roster: Vec<User>) {
    struct BrokenFeed;

    #[async_trait]
    impl AssignmentChangeFeed for BrokenFeed {
        async fn subscribe(
            &self,
            _company_id: &CompanyId,
            _listener: ChangeListener,
        ) -> Result<Subscription, ChangeFeedError> {
            Err(ChangeFeedError::unavailable("no channel"))
        }
    }

    let store = Arc::new(StubStore::with(roster, &[]));
    let service = PayCycleService::new(store, Arc::new(BrokenFeed));
    let session = ManagerSession::new(service, SyncPolicy::Overwrite);

    session.open(company(), PayCycle::Monthly).await;

    assert!(session.is_open());
    assert!(!session.is_subscribed());
    assert_eq!(session.state().roster().len(), 3);
}

#[rstest]
#[tokio::test]
async fn save_inserts_added_user_and_closes(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &["a"]), SyncPolicy::Overwrite);
    h.session.open(company(), PayCycle::Weekly).await;

    let payload = h.session.begin_drag(Pane::Unassigned, &uid("b"));
    h.session.drag_enter(Pane::Assigned);
    h.session.drop_payload(Pane::Assigned, Some(&payload));
    let outcome = h.session.save().await.expect("save succeeds");

    assert_eq!(
        outcome,
        ReconcileOutcome {
            inserted: 1,
            deleted: 0
        }
    );
    let inserted = h.store.inserted.lock().expect("inserted lock").clone();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted.first().map(|row| row.user_id.clone()), Some(uid("b")));
    assert!(!h.session.is_open());
    assert_eq!(h.feed.releases.load(Ordering::SeqCst), 1);
    assert_eq!(h.feed.active(), 0);
}

#[rstest]
#[tokio::test]
async fn failed_save_keeps_session_open_and_releases_flag(roster: Vec<User>) {
    let store = StubStore::with(roster, &[]);
    store.fail_writes.store(true, Ordering::SeqCst);
    let h = harness_with(store, SyncPolicy::Overwrite);
    h.session.open(company(), PayCycle::Weekly).await;
    h.session.dispatch(Action::MoveToAssigned(vec![uid("c")]));

    let error = h.session.save().await.expect_err("insert rejected");

    assert!(matches!(error, SaveError::DataUnavailable(_)));
    assert!(h.session.is_open());
    assert!(!h.session.is_saving());
    assert_eq!(h.session.state().assigned_ids(), vec![uid("c")]);
}

#[rstest]
#[tokio::test]
async fn concurrent_save_is_rejected(roster: Vec<User>) {
    let gate = Arc::new(Notify::new());
    let mut store = StubStore::with(roster, &[]);
    store.gate = Some(gate.clone());
    let h = harness_with(store, SyncPolicy::Overwrite);
    h.session.open(company(), PayCycle::Weekly).await;

    let (first, second) = tokio::join!(h.session.save(), async {
        tokio::task::yield_now().await;
        let result = h.session.save().await;
        gate.notify_one();
        result
    });

    assert!(first.is_ok());
    assert_eq!(second, Err(SaveError::AlreadySaving));
    assert!(!h.session.is_saving());
}

#[rstest]
#[tokio::test]
async fn save_requires_open_session() {
    let h = harness_with(StubStore::default(), SyncPolicy::Overwrite);
    assert_eq!(h.session.save().await, Err(SaveError::NotOpen));
}

#[rstest]
#[tokio::test]
async fn notification_overwrites_unsaved_addition(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &["a"]), SyncPolicy::Overwrite);
    h.session.open(company(), PayCycle::Weekly).await;
    h.session.dispatch(Action::MoveToAssigned(vec![uid("b")]));
    assert_eq!(h.session.state().assigned_ids(), vec![uid("a"), uid("b")]);

    h.feed.fire();

    let session = &h.session;
    assert!(eventually(|| session.state().assigned_ids() == vec![uid("a")]).await);
    assert_eq!(session.state().version(), SnapshotVersion::new(1));
}

#[rstest]
#[tokio::test]
async fn notification_under_merge_keeps_local_edits(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &["a"]), SyncPolicy::Merge);
    h.session.open(company(), PayCycle::Weekly).await;
    h.session.dispatch(Action::MoveToAssigned(vec![uid("b")]));
    h.store.set_assigned(&["a", "c"]);

    h.feed.fire();

    let session = &h.session;
    assert!(
        eventually(|| session.state().assigned_ids() == vec![uid("a"), uid("c"), uid("b")]).await
    );
}

#[rstest]
#[tokio::test]
async fn prompt_user_policy_waits_for_resolution(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &["a"]), SyncPolicy::PromptUser);
    h.session.open(company(), PayCycle::Weekly).await;
    h.store.set_assigned(&["c"]);

    h.feed.fire();

    let session = &h.session;
    assert!(eventually(|| session.state().pending_conflict().is_some()).await);
    assert_eq!(session.state().assigned_ids(), vec![uid("a")]);
    session.resolve_conflict(true);
    assert_eq!(session.state().assigned_ids(), vec![uid("c")]);
}

#[rstest]
#[tokio::test]
async fn reopen_releases_previous_subscription(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &[]), SyncPolicy::Overwrite);
    let first = h.session.open(company(), PayCycle::Weekly).await;
    let second = h.session.open(company(), PayCycle::Monthly).await;

    assert_ne!(first, second);
    assert_eq!(h.feed.releases.load(Ordering::SeqCst), 1);
    assert_eq!(h.feed.active(), 1);
    assert_eq!(
        h.session.target().map(|target| target.pay_cycle),
        Some(PayCycle::Monthly)
    );
}

#[rstest]
#[tokio::test]
async fn close_is_idempotent_and_ignores_later_notifications(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &["a"]), SyncPolicy::Overwrite);
    h.session.open(company(), PayCycle::Weekly).await;

    h.session.close();
    h.session.close();
    h.feed.fire();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!h.session.is_open());
    assert_eq!(h.feed.releases.load(Ordering::SeqCst), 1);
    assert!(h.session.state().assigned().is_empty());
}

#[rstest]
#[tokio::test]
async fn actions_after_close_are_ignored(roster: Vec<User>) {
    let h = harness_with(StubStore::with(roster, &["a"]), SyncPolicy::Overwrite);
    h.session.open(company(), PayCycle::Weekly).await;
    h.session.close();

    h.session.dispatch(Action::MoveToAssigned(vec![uid("b")]));

    assert!(h.session.state().assigned().is_empty());
}

#[rstest]
#[tokio::test]
async fn undecodable_transfer_only_clears_hover(roster: Vec<User>) {
    let service = PayCycleService::new(
        Arc::new(StubStore::with(roster, &["a"])),
        Arc::new(FixtureAssignmentChangeFeed),
    );
    let session = ManagerSession::new(service, SyncPolicy::Overwrite);
    session.open(company(), PayCycle::Weekly).await;

    session.drag_enter(Pane::Assigned);
    session.drop_transfer(Pane::Assigned, Pane::Unassigned, "garbage");

    let state = session.state();
    assert!(!state.is_drag_over(Pane::Assigned));
    assert_eq!(state.assigned_ids(), vec![uid("a")]);

    session.drop_transfer(Pane::Assigned, Pane::Unassigned, r#"["b","c"]"#);
    assert_eq!(
        session.state().assigned_ids(),
        vec![uid("a"), uid("b"), uid("c")]
    );
}
