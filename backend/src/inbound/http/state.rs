//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the domain
//! service, so they stay testable with in-memory or mocked ports.

use std::sync::Arc;

use crate::domain::PayCycleService;
use crate::domain::ports::{AssignmentChangeFeed, CompanyDirectory, PayCycleStore};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub pay_cycles: PayCycleService,
}

impl HttpState {
    pub fn new(pay_cycles: PayCycleService) -> Self {
        Self { pay_cycles }
    }

    /// Build the service from individual port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::inbound::http::state::HttpState;
    /// use backend::outbound::memory::InMemoryPayCycleStore;
    /// use backend::outbound::realtime::ChangeBroadcaster;
    ///
    /// let broadcaster = ChangeBroadcaster::new();
    /// let store = InMemoryPayCycleStore::new().with_broadcaster(broadcaster.clone());
    /// let state = HttpState::from_ports(
    ///     Arc::new(store.clone()),
    ///     Arc::new(broadcaster),
    ///     Arc::new(store),
    /// );
    /// let _service = state.pay_cycles.clone();
    /// ```
    pub fn from_ports(
        store: Arc<dyn PayCycleStore>,
        feed: Arc<dyn AssignmentChangeFeed>,
        directory: Arc<dyn CompanyDirectory>,
    ) -> Self {
        Self::new(PayCycleService::new(store, feed).with_directory(directory))
    }
}
