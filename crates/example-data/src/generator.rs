//! Deterministic roster generation from seed definitions.
//!
//! The same registry and seed definition always produce an identical roster.

use std::collections::HashSet;

use fake::Fake;
use fake::faker::company::raw::CompanyName;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::registry::{SeedDefinition, SeedRegistry};
use crate::seed::{ExampleCompanySeed, ExampleRoster, ExampleUserSeed, PayCycleSeed, RoleSeed};
use crate::validation::{USER_NAME_MAX, email_local_part, is_valid_user_name};

/// Maximum number of attempts to generate a valid user name.
const MAX_NAME_ATTEMPTS: usize = 100;

/// One in this many non-admin users is a manager.
const MANAGER_ONE_IN: u32 = 5;

/// Chance a user starts in a pay cycle (three in four).
const ASSIGNED_NUMERATOR: u32 = 3;
const ASSIGNED_DENOMINATOR: u32 = 4;

/// Generates a company roster from a seed definition.
///
/// The first user is always the company admin. Every later user is a
/// manager roughly one time in five and an employee otherwise. About three
/// quarters of the users start in a randomly chosen pay cycle. Email
/// addresses are `first.last@<emailDomain>`, numbered when two users share
/// a name.
///
/// # Errors
///
/// Returns [`GenerationError`] if:
/// - The seed asks for zero users
/// - Name generation fails after maximum retries
///
/// # Example
///
/// ```
/// use example_data::{RoleSeed, SeedRegistry, generate_example_roster};
///
/// let json = r#"{
///     "version": 1,
///     "emailDomain": "example.com",
///     "seeds": [{"name": "test", "seed": 42, "userCount": 4, "companyName": "Acme Payroll"}]
/// }"#;
///
/// let registry = SeedRegistry::from_json(json).expect("valid");
/// let seed_def = registry.find_seed("test").expect("found");
/// let roster = generate_example_roster(&registry, seed_def).expect("generated");
///
/// assert_eq!(roster.company.name, "Acme Payroll");
/// assert_eq!(roster.users.first().map(|u| u.role), Some(RoleSeed::Admin));
/// // Same seed produces an identical roster
/// let again = generate_example_roster(&registry, seed_def).expect("generated");
/// assert_eq!(roster, again);
/// ```
pub fn generate_example_roster(
    registry: &SeedRegistry,
    seed_def: &SeedDefinition,
) -> Result<ExampleRoster, GenerationError> {
    if seed_def.user_count() == 0 {
        return Err(GenerationError::EmptyRoster {
            name: seed_def.name().to_owned(),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed_def.seed());
    let company = generate_company(&mut rng, seed_def);

    let mut emails = HashSet::with_capacity(seed_def.user_count());
    let mut users = Vec::with_capacity(seed_def.user_count());
    for position in 0..seed_def.user_count() {
        let role = if position == 0 {
            RoleSeed::Admin
        } else {
            select_role(&mut rng)
        };
        users.push(generate_single_user(
            &mut rng,
            registry,
            role,
            &mut emails,
        )?);
    }

    Ok(ExampleRoster { company, users })
}

fn generate_company(rng: &mut ChaCha8Rng, seed_def: &SeedDefinition) -> ExampleCompanySeed {
    let id = Uuid::from_u128(rng.random());
    let name = seed_def
        .company_name()
        .map_or_else(|| CompanyName(EN).fake_with_rng(rng), str::to_owned);
    ExampleCompanySeed { id, name }
}

fn select_role(rng: &mut ChaCha8Rng) -> RoleSeed {
    if rng.random_ratio(1, MANAGER_ONE_IN) {
        RoleSeed::Manager
    } else {
        RoleSeed::Employee
    }
}

/// Generates a single user with the provided RNG.
fn generate_single_user(
    rng: &mut ChaCha8Rng,
    registry: &SeedRegistry,
    role: RoleSeed,
    emails: &mut HashSet<String>,
) -> Result<ExampleUserSeed, GenerationError> {
    let id = Uuid::from_u128(rng.random());
    let name = generate_name(rng)?;
    let email = unique_email(&name, registry.email_domain(), emails);
    let department = registry.departments().choose(rng).cloned();
    let pay_cycle = if rng.random_ratio(ASSIGNED_NUMERATOR, ASSIGNED_DENOMINATOR) {
        PayCycleSeed::ALL.choose(rng).copied()
    } else {
        None
    };

    Ok(ExampleUserSeed {
        id,
        name,
        email,
        role,
        department,
        pay_cycle,
    })
}

/// Generates a valid "First Last" name, retrying on rejected candidates.
fn generate_name(rng: &mut ChaCha8Rng) -> Result<String, GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let first: String = FirstName(EN).fake_with_rng(rng);
        let last: String = LastName(EN).fake_with_rng(rng);
        let candidate = format!("{first} {last}");

        if is_valid_user_name(&candidate) && !email_local_part(&candidate).is_empty() {
            return Ok(candidate.chars().take(USER_NAME_MAX).collect());
        }
    }

    Err(GenerationError::NameGenerationFailed {
        max_attempts: MAX_NAME_ATTEMPTS,
    })
}

/// Derives an address from `name`, numbering repeats: `ada.lovelace2@...`.
fn unique_email(name: &str, domain: &str, taken: &mut HashSet<String>) -> String {
    let local = email_local_part(name);
    let mut candidate = format!("{local}@{domain}");
    let mut suffix: u32 = 2;
    while taken.contains(&candidate) {
        candidate = format!("{local}{suffix}@{domain}");
        suffix = suffix.saturating_add(1);
    }
    taken.insert(candidate.clone());
    candidate
}
