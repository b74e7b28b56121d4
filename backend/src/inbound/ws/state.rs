//! Shared WebSocket adapter state.

use crate::domain::PayCycleService;

/// Host accepted over HTTPS (with its subdomains) when none is configured.
pub const DEFAULT_ALLOWED_HOST: &str = "timesheet.example";

/// Dependency bundle for the WebSocket entry point.
#[derive(Clone)]
pub struct WsState {
    pub pay_cycles: PayCycleService,
    pub allowed_host: String,
}

impl WsState {
    pub fn new(pay_cycles: PayCycleService) -> Self {
        Self {
            pay_cycles,
            allowed_host: DEFAULT_ALLOWED_HOST.to_owned(),
        }
    }

    /// Accept browser origins on `host` and its subdomains.
    pub fn with_allowed_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_host = host.into();
        self
    }
}
