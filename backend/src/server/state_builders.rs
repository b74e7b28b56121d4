//! Builders wiring outbound adapters into the pay-cycle service.

use std::sync::Arc;

use backend::domain::PayCycleService;
use backend::outbound::persistence::{DieselCompanyDirectory, DieselPayCycleStore};
use backend::outbound::realtime::ChangeBroadcaster;

use super::config::StoreBackend;

/// Build the service over the configured store.
///
/// Both backends publish mutations on one broadcaster that also serves as
/// the change feed, so every session and socket of the process observes
/// writes made through any of them.
pub(super) fn build_pay_cycle_service(backend: &StoreBackend) -> PayCycleService {
    let broadcaster = ChangeBroadcaster::new();
    match backend {
        StoreBackend::Database(pool) => {
            let store = DieselPayCycleStore::new(pool.clone()).with_broadcaster(broadcaster.clone());
            PayCycleService::new(Arc::new(store), Arc::new(broadcaster))
                .with_directory(Arc::new(DieselCompanyDirectory::new(pool.clone())))
        }
        StoreBackend::Memory(store) => {
            let store = store.clone().with_broadcaster(broadcaster.clone());
            PayCycleService::new(Arc::new(store.clone()), Arc::new(broadcaster))
                .with_directory(Arc::new(store))
        }
    }
}
