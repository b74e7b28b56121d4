//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed store and company directory (Diesel)
//! - **memory**: process-local store used without a database and in tests
//! - **realtime**: in-process change broadcaster behind `AssignmentChangeFeed`
//!
//! Adapters translate between domain types and infrastructure representations
//! and contain no business logic.

pub mod memory;
pub mod persistence;
pub mod realtime;
