//! Realtime change notification adapters.

mod change_broadcaster;

pub use change_broadcaster::ChangeBroadcaster;
