//! HTTP inbound adapter exposing the pay-cycle JSON endpoints.

pub mod companies;
pub mod error;
pub mod health;
pub mod pay_cycles;
pub mod request_trace;
pub mod state;

pub use error::ApiResult;
