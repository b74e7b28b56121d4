//! Inbound adapters translating HTTP and WebSocket traffic into calls on the
//! pay-cycle service while keeping framework details at the edge.

pub mod http;
pub mod ws;
