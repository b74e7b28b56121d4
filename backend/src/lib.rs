//! Pay-cycle assignment manager backend.
//!
//! Administrators move a company's users between pay-cycle buckets. The
//! crate follows a hexagonal layout: `domain` holds the model, the
//! reconciler and the manager session; `inbound` adapts HTTP and WebSocket
//! traffic; `outbound` provides PostgreSQL, in-memory and realtime adapters.

pub mod domain;
#[cfg(feature = "example-data")]
pub mod example_data;
pub mod inbound;
pub mod outbound;
