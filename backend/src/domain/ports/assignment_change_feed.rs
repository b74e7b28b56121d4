//! Port for company-scoped assignment change notifications.
//!
//! Listeners carry no payload: a notification only says that some
//! assignment row of the company was inserted, updated or deleted, and the
//! subscriber is expected to re-fetch whatever it displays.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::CompanyId;

use super::define_port_error;

define_port_error! {
    /// Errors raised when a change subscription cannot be established.
    pub enum ChangeFeedError {
        /// The realtime channel is not available.
        Unavailable { message: String } => "assignment change feed unavailable: {message}",
    }
}

/// Callback invoked once per change notification.
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

/// Handle to an active change subscription.
///
/// Releasing is idempotent; dropping the handle releases it as well.
pub struct Subscription {
    released: AtomicBool,
    release: Box<dyn Fn() + Send + Sync>,
}

impl Subscription {
    /// Wrap the adapter-specific release action.
    pub fn new(release: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            released: AtomicBool::new(false),
            release: Box::new(release),
        }
    }

    /// Subscription that owns no upstream resources.
    pub fn detached() -> Self {
        Self::new(|| {})
    }

    /// Stop receiving notifications. Subsequent calls do nothing.
    pub fn unsubscribe(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            (self.release)();
        }
    }

    /// Whether [`Self::unsubscribe`] has already run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentChangeFeed: Send + Sync {
    /// Register `listener` for changes touching `company_id`'s assignments.
    async fn subscribe(
        &self,
        company_id: &CompanyId,
        listener: ChangeListener,
    ) -> Result<Subscription, ChangeFeedError>;
}

/// Feed that accepts subscriptions and never notifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssignmentChangeFeed;

#[async_trait]
impl AssignmentChangeFeed for FixtureAssignmentChangeFeed {
    async fn subscribe(
        &self,
        _company_id: &CompanyId,
        _listener: ChangeListener,
    ) -> Result<Subscription, ChangeFeedError> {
        Ok(Subscription::detached())
    }
}
