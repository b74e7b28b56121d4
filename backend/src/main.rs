//! Backend entry-point: loads settings, picks the store and serves the
//! pay-cycle API and change feed.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Report, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::memory::InMemoryPayCycleStore;
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, ServerSettings, create_server};

#[cfg(feature = "example-data")]
use backend::example_data::{ExampleDataSettings, seed_example_data_on_startup};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|err| eyre!("loading settings: {err}"))?;
    let bind_addr = settings.bind_addr().map_err(Report::new)?;
    let mut config =
        ServerConfig::new(bind_addr).with_allowed_origin_host(settings.allowed_origin_host());

    if let Some(url) = settings.database_url() {
        let max_size = settings.database_max_connections().map_err(Report::new)?;
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(max_size))
            .await
            .map_err(|err| eyre!("creating database pool: {}", err.into_message()))?;
        info!(max_size, "serving from PostgreSQL");
        config = config.with_db_pool(pool);
    } else {
        let store = InMemoryPayCycleStore::new();
        seed_store(&store)?;
        info!("no database configured; serving from the in-memory store");
        config = config.with_memory_store(store);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .with_context(|| format!("binding {bind_addr}"))?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated")
}

#[cfg(feature = "example-data")]
fn seed_store(store: &InMemoryPayCycleStore) -> Result<()> {
    let settings =
        ExampleDataSettings::load().map_err(|err| eyre!("loading example data settings: {err}"))?;
    seed_example_data_on_startup(&settings, store).map_err(Report::new)?;
    Ok(())
}

#[cfg(not(feature = "example-data"))]
fn seed_store(_store: &InMemoryPayCycleStore) -> Result<()> {
    Ok(())
}
