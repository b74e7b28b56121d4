//! In-process fan-out of assignment change notifications.
//!
//! Stores call [`ChangeBroadcaster::publish`] after every successful
//! mutation; manager sessions and WebSocket connections subscribe through
//! the [`AssignmentChangeFeed`] port. Notifications do not cross process
//! boundaries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::CompanyId;
use crate::domain::ports::{AssignmentChangeFeed, ChangeFeedError, ChangeListener, Subscription};

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<u64, (CompanyId, ChangeListener)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Company-scoped listener registry.
#[derive(Clone, Default)]
pub struct ChangeBroadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify every listener registered for `company_id`.
    ///
    /// Listeners run on the caller's thread after the registry lock is
    /// released, so they may subscribe or unsubscribe freely.
    pub fn publish(&self, company_id: &CompanyId) -> usize {
        let targets: Vec<ChangeListener> = lock(&self.registry)
            .listeners
            .values()
            .filter(|(company, _)| company == company_id)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &targets {
            listener();
        }
        debug!(company_id = %company_id, listeners = targets.len(), "published assignment change");
        targets.len()
    }

    /// Number of live subscriptions for `company_id`.
    pub fn listener_count(&self, company_id: &CompanyId) -> usize {
        lock(&self.registry)
            .listeners
            .values()
            .filter(|(company, _)| company == company_id)
            .count()
    }

    fn register(&self, company_id: CompanyId, listener: ChangeListener) -> Subscription {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id = registry.next_id.wrapping_add(1);
            registry.listeners.insert(id, (company_id, listener));
            id
        };
        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).listeners.remove(&id);
            }
        })
    }
}

#[async_trait]
impl AssignmentChangeFeed for ChangeBroadcaster {
    async fn subscribe(
        &self,
        company_id: &CompanyId,
        listener: ChangeListener,
    ) -> Result<Subscription, ChangeFeedError> {
        Ok(self.register(company_id.clone(), listener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (ChangeListener, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let listener: ChangeListener = Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (listener, hits)
    }

    #[rstest]
    #[tokio::test]
    async fn publish_reaches_only_matching_company() {
        let broadcaster = ChangeBroadcaster::new();
        let (acme_listener, acme_hits) = counter();
        let (globex_listener, globex_hits) = counter();
        let _acme = broadcaster
            .subscribe(&CompanyId::from("acme"), acme_listener)
            .await
            .expect("subscribe");
        let _globex = broadcaster
            .subscribe(&CompanyId::from("globex"), globex_listener)
            .await
            .expect("subscribe");

        assert_eq!(broadcaster.publish(&CompanyId::from("acme")), 1);
        assert_eq!(acme_hits.load(Ordering::SeqCst), 1);
        assert_eq!(globex_hits.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn unsubscribed_listeners_stop_receiving() {
        let broadcaster = ChangeBroadcaster::new();
        let company = CompanyId::from("acme");
        let (listener, hits) = counter();
        let subscription = broadcaster
            .subscribe(&company, listener)
            .await
            .expect("subscribe");
        assert_eq!(broadcaster.listener_count(&company), 1);

        subscription.unsubscribe();
        broadcaster.publish(&company);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(broadcaster.listener_count(&company), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn dropping_subscription_unregisters() {
        let broadcaster = ChangeBroadcaster::new();
        let company = CompanyId::from("acme");
        let (listener, _) = counter();
        drop(
            broadcaster
                .subscribe(&company, listener)
                .await
                .expect("subscribe"),
        );
        assert_eq!(broadcaster.listener_count(&company), 0);
    }
}
