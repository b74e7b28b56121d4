//! Startup seeding of the in-memory store from the example registry.

use example_data::{
    ExampleRoster, GenerationError, PayCycleSeed, RegistryError, RoleSeed, SeedRegistry,
    generate_example_roster,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    Company, CompanyId, PayCycle, User, UserId, UserRole, UserValidationError,
};
use crate::example_data::config::{ExampleDataSettings, ExampleDataSettingsError};
use crate::outbound::memory::InMemoryPayCycleStore;

/// Summary of a seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub seed_name: String,
    pub company_id: CompanyId,
    pub user_count: usize,
    pub assignment_count: usize,
}

/// Errors returned while executing startup seeding.
#[derive(Debug, Error)]
pub enum StartupSeedingError {
    /// Registry loading or seed lookup failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    /// Roster generation failed.
    #[error("example roster generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// A generated user failed domain validation.
    #[error("generated user failed validation: {0}")]
    InvalidUser(#[from] UserValidationError),
    /// The settings cannot drive a seeding run.
    #[error("invalid example data settings: {0}")]
    Settings(#[from] ExampleDataSettingsError),
}

/// Populate `store` with the configured example roster when enabled.
///
/// Returns `Ok(None)` when seeding is disabled.
///
/// # Examples
///
/// ```rust,no_run
/// use backend::example_data::{ExampleDataSettings, seed_example_data_on_startup};
/// use backend::outbound::memory::InMemoryPayCycleStore;
///
/// let settings = ExampleDataSettings {
///     enabled: false,
///     seed_name: None,
///     count: None,
///     registry_path: None,
/// };
/// let store = InMemoryPayCycleStore::new();
/// let outcome = seed_example_data_on_startup(&settings, &store).expect("seeding");
/// assert!(outcome.is_none());
/// ```
pub fn seed_example_data_on_startup(
    settings: &ExampleDataSettings,
    store: &InMemoryPayCycleStore,
) -> Result<Option<SeedOutcome>, StartupSeedingError> {
    if !settings.enabled {
        info!(reason = "disabled", "example data seeding skipped");
        return Ok(None);
    }

    settings.validate()?;
    let seed_name = settings.seed_name();

    let registry_path = settings.registry_path();
    let registry = SeedRegistry::from_file(&registry_path)?;
    let seed_def = settings.sized(registry.find_seed(seed_name)?.clone());
    if seed_def.user_count() == 0 {
        warn!(seed_name, "example data seed requests no users; skipping");
        return Ok(None);
    }

    let roster = generate_example_roster(&registry, &seed_def)?;
    let outcome = apply_roster(seed_name, &roster, store)?;
    info!(
        seed_name = %outcome.seed_name,
        company_id = %outcome.company_id,
        user_count = outcome.user_count,
        assignment_count = outcome.assignment_count,
        "example data seeding applied"
    );
    Ok(Some(outcome))
}

/// Insert the company, its users and their starting assignments.
///
/// Managers report to the admin; employees report to the most recently
/// generated manager, or the admin before any manager appears.
fn apply_roster(
    seed_name: &str,
    roster: &ExampleRoster,
    store: &InMemoryPayCycleStore,
) -> Result<SeedOutcome, StartupSeedingError> {
    let company_id = CompanyId::from(roster.company.id);
    store.add_company(Company::new(company_id.clone(), roster.company.name.clone()));

    let mut admin: Option<UserId> = None;
    let mut manager: Option<UserId> = None;
    let mut assignment_count = 0;

    for seed in &roster.users {
        let id = UserId::new(seed.id.to_string())?;
        let role = role_from_seed(seed.role);
        let mut user = User::try_new(id.clone(), seed.name.clone(), seed.email.clone(), role)?
            .with_company(company_id.clone());
        if let Some(department) = &seed.department {
            user = user.with_department(department.clone());
        }
        let reports_to = match role {
            UserRole::Admin => None,
            UserRole::Manager => admin.clone(),
            UserRole::Employee => manager.clone().or_else(|| admin.clone()),
        };
        if let Some(manager_id) = reports_to {
            user = user.with_manager(manager_id);
        }
        match role {
            UserRole::Admin => admin = Some(id.clone()),
            UserRole::Manager => manager = Some(id.clone()),
            UserRole::Employee => {}
        }
        store.add_user(user);

        if let Some(cycle) = seed.pay_cycle {
            store.assign(id, company_id.clone(), pay_cycle_from_seed(cycle));
            assignment_count += 1;
        }
    }

    Ok(SeedOutcome {
        seed_name: seed_name.to_owned(),
        company_id,
        user_count: roster.users.len(),
        assignment_count,
    })
}

const fn role_from_seed(seed: RoleSeed) -> UserRole {
    match seed {
        RoleSeed::Admin => UserRole::Admin,
        RoleSeed::Manager => UserRole::Manager,
        RoleSeed::Employee => UserRole::Employee,
    }
}

const fn pay_cycle_from_seed(seed: PayCycleSeed) -> PayCycle {
    match seed {
        PayCycleSeed::Weekly => PayCycle::Weekly,
        PayCycleSeed::Biweekly => PayCycle::Biweekly,
        PayCycleSeed::Semimonthly => PayCycle::Semimonthly,
        PayCycleSeed::Monthly => PayCycle::Monthly,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{CompanyDirectory, PayCycleStore};

    fn fixture_registry() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("example-data")
            .join("seeds.json")
    }

    #[fixture]
    fn enabled() -> ExampleDataSettings {
        ExampleDataSettings {
            enabled: true,
            seed_name: None,
            count: None,
            registry_path: Some(fixture_registry()),
        }
    }

    #[rstest]
    fn disabled_settings_leave_the_store_empty() {
        let store = InMemoryPayCycleStore::new();
        let settings = ExampleDataSettings {
            enabled: false,
            seed_name: None,
            count: None,
            registry_path: None,
        };

        let outcome = seed_example_data_on_startup(&settings, &store).expect("seeding");
        assert!(outcome.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn seeds_company_users_and_assignments(enabled: ExampleDataSettings) {
        let store = InMemoryPayCycleStore::new();

        let outcome = seed_example_data_on_startup(&enabled, &store)
            .expect("seeding")
            .expect("enabled seeding reports an outcome");

        let companies = store.list_companies().await.expect("companies");
        assert_eq!(companies.len(), 1);
        let users = store
            .list_company_users(&outcome.company_id)
            .await
            .expect("users");
        assert_eq!(users.len(), outcome.user_count);

        let mut assigned = 0;
        for cycle in PayCycle::ALL {
            assigned += store.assignments(&outcome.company_id, cycle).len();
        }
        assert_eq!(assigned, outcome.assignment_count);
        assert!(assigned > 0);
    }

    #[rstest]
    fn count_override_resizes_the_roster(mut enabled: ExampleDataSettings) {
        enabled.count = Some(3);
        let store = InMemoryPayCycleStore::new();

        let outcome = seed_example_data_on_startup(&enabled, &store)
            .expect("seeding")
            .expect("outcome");
        assert_eq!(outcome.user_count, 3);
    }

    #[rstest]
    fn zero_count_override_is_rejected(mut enabled: ExampleDataSettings) {
        enabled.count = Some(0);
        let store = InMemoryPayCycleStore::new();

        let err = seed_example_data_on_startup(&enabled, &store).expect_err("zero users");
        assert!(matches!(
            err,
            StartupSeedingError::Settings(ExampleDataSettingsError::ZeroUserCount)
        ));
    }

    #[rstest]
    fn unknown_seed_is_reported(mut enabled: ExampleDataSettings) {
        enabled.seed_name = Some("no-such-seed".to_owned());
        let store = InMemoryPayCycleStore::new();

        let err = seed_example_data_on_startup(&enabled, &store).expect_err("unknown seed");
        assert!(matches!(
            err,
            StartupSeedingError::Registry(RegistryError::SeedNotFound { .. })
        ));
    }

    #[rstest]
    fn blank_seed_name_is_rejected(mut enabled: ExampleDataSettings) {
        enabled.seed_name = Some("   ".to_owned());
        let store = InMemoryPayCycleStore::new();

        let err = seed_example_data_on_startup(&enabled, &store).expect_err("blank seed");
        assert!(matches!(
            err,
            StartupSeedingError::Settings(ExampleDataSettingsError::BlankSeedName)
        ));
    }

    #[rstest]
    fn missing_registry_is_reported(mut enabled: ExampleDataSettings) {
        enabled.registry_path = Some(PathBuf::from("/nonexistent/seeds.json"));
        let store = InMemoryPayCycleStore::new();

        let err = seed_example_data_on_startup(&enabled, &store).expect_err("missing file");
        assert!(matches!(
            err,
            StartupSeedingError::Registry(RegistryError::IoError { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn everyone_but_the_admin_reports_to_someone() {
        let store = InMemoryPayCycleStore::new();
        let registry = SeedRegistry::from_file(&fixture_registry()).expect("registry");
        let seed_def = registry.find_seed("harbour-payroll").expect("seed");
        let roster = generate_example_roster(&registry, seed_def).expect("roster");

        let outcome = apply_roster("harbour-payroll", &roster, &store).expect("apply");

        let users = store
            .list_company_users(&outcome.company_id)
            .await
            .expect("users");
        assert_eq!(users.len(), roster.users.len());
        for user in users {
            assert_eq!(
                user.manager_id().is_none(),
                user.role() == UserRole::Admin,
                "unexpected reporting line for {}",
                user.name()
            );
        }
    }
}
