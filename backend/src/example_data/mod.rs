//! Example roster seeding for the in-memory store.

mod config;
mod startup;

pub use config::{ExampleDataSettings, ExampleDataSettingsError};
pub use startup::{SeedOutcome, StartupSeedingError, seed_example_data_on_startup};
