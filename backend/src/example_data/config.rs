//! Example data configuration loaded via OrthoConfig.

use std::path::PathBuf;

use example_data::SeedDefinition;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SEED_NAME: &str = "harbour-payroll";

fn default_registry_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("example-data")
        .join("seeds.json")
}

/// Configuration values controlling example roster seeding at startup.
///
/// Seeding only applies to the in-memory store; a configured database keeps
/// its own rows.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EXAMPLE_DATA")]
pub struct ExampleDataSettings {
    /// Enable example data seeding on startup.
    #[ortho_config(default = false)]
    pub enabled: bool,
    /// Seed name to load from the registry.
    pub seed_name: Option<String>,
    /// Optional override for the roster size.
    #[ortho_config(file_key = "user_count")]
    pub count: Option<usize>,
    /// Optional registry path override.
    pub registry_path: Option<PathBuf>,
}

/// Settings that cannot drive a seeding run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExampleDataSettingsError {
    /// The configured seed name is blank.
    #[error("seed name must not be empty")]
    BlankSeedName,
    /// The roster size override asks for no users.
    #[error("user count override must be at least 1")]
    ZeroUserCount,
}

impl ExampleDataSettings {
    /// Return the configured seed name, trimmed, falling back to the default.
    pub fn seed_name(&self) -> &str {
        self.seed_name.as_deref().map_or(DEFAULT_SEED_NAME, str::trim)
    }

    /// Reject a blank seed name or an empty roster override.
    ///
    /// # Errors
    /// [`ExampleDataSettingsError`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ExampleDataSettingsError> {
        if self.seed_name().is_empty() {
            return Err(ExampleDataSettingsError::BlankSeedName);
        }
        if self.count == Some(0) {
            return Err(ExampleDataSettingsError::ZeroUserCount);
        }
        Ok(())
    }

    /// Resize `seed_def` to the configured roster size, if any.
    #[must_use]
    pub fn sized(&self, seed_def: SeedDefinition) -> SeedDefinition {
        match self.count {
            Some(count) => seed_def.with_user_count(count),
            None => seed_def,
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(default_registry_path)
    }
}
