//! PostgreSQL persistence adapters using Diesel.
//!
//! Adapters only translate between Diesel rows and domain types; row structs
//! (`models`) and table definitions (`schema`) stay private to this module.
//! Connections come from a `bb8` pool driven by `diesel-async`.
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselPayCycleStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/timesheet")).await?;
//! let store = DieselPayCycleStore::new(pool);
//! ```

mod diesel_company_directory;
mod diesel_error_mapping;
mod diesel_pay_cycle_store;
mod models;
mod pool;
mod schema;

pub use diesel_company_directory::DieselCompanyDirectory;
pub use diesel_pay_cycle_store::DieselPayCycleStore;
pub use pool::{DbPool, PoolConfig, PoolError};
