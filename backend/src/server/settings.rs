//! Server configuration loaded via OrthoConfig.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use backend::inbound::ws::state::DEFAULT_ALLOWED_HOST;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Invalid values in [`ServerSettings`].
#[derive(Debug, Error)]
pub enum ServerSettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("database_max_connections must be at least 1")]
    ZeroConnections,
}

/// Values controlling the HTTP listener and the backing store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PAYCYCLE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    /// Host accepted in WebSocket `Origin` headers over HTTPS.
    pub allowed_origin_host: Option<String>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerSettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|source| ServerSettingsError::BindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Database URL with blank values treated as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn database_max_connections(&self) -> Result<u32, ServerSettingsError> {
        match self.database_max_connections {
            Some(0) => Err(ServerSettingsError::ZeroConnections),
            Some(value) => Ok(value),
            None => Ok(DEFAULT_MAX_CONNECTIONS),
        }
    }

    pub fn allowed_origin_host(&self) -> &str {
        self.allowed_origin_host
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_HOST)
    }
}
