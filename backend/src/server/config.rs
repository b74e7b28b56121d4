//! HTTP server configuration object.

use std::net::SocketAddr;

use backend::inbound::ws::state::DEFAULT_ALLOWED_HOST;
use backend::outbound::memory::InMemoryPayCycleStore;
use backend::outbound::persistence::DbPool;

/// Store backing the pay-cycle ports.
#[derive(Clone)]
pub enum StoreBackend {
    Database(DbPool),
    Memory(InMemoryPayCycleStore),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) allowed_origin_host: String,
    pub(crate) backend: StoreBackend,
}

impl ServerConfig {
    /// Serve from an empty in-memory store until a backend is attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            allowed_origin_host: DEFAULT_ALLOWED_HOST.to_owned(),
            backend: StoreBackend::Memory(InMemoryPayCycleStore::new()),
        }
    }

    /// Use PostgreSQL through the given pool.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.backend = StoreBackend::Database(pool);
        self
    }

    /// Use a pre-populated in-memory store.
    #[must_use]
    pub fn with_memory_store(mut self, store: InMemoryPayCycleStore) -> Self {
        self.backend = StoreBackend::Memory(store);
        self
    }

    #[must_use]
    pub fn with_allowed_origin_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_origin_host = host.into();
        self
    }
}
