//! Deterministic example rosters for demonstrating the pay-cycle manager.
//!
//! A JSON seed registry names reproducible seeds. Each seed expands into a
//! company, its employees and their initial pay-cycle buckets. The crate does
//! not depend on backend domain types; the backend converts the generated
//! records at the point of use.
//!
//! # Overview
//!
//! - Loading seed registries from JSON strings or files
//! - Deterministic roster generation using named seeds
//! - Name and email validation matching backend constraints
//!
//! # Example
//!
//! ```
//! use example_data::{SeedRegistry, generate_example_roster};
//!
//! let json = r#"{
//!     "version": 1,
//!     "emailDomain": "example.com",
//!     "departments": ["Payroll", "Engineering"],
//!     "seeds": [{"name": "test-seed", "seed": 42, "userCount": 3}]
//! }"#;
//!
//! let registry = SeedRegistry::from_json(json).expect("valid registry");
//! let seed_def = registry.find_seed("test-seed").expect("seed exists");
//! let roster = generate_example_roster(&registry, seed_def).expect("generation succeeds");
//!
//! assert_eq!(roster.users.len(), 3);
//! ```

mod error;
mod generator;
mod registry;
mod seed;
mod validation;

pub use error::{GenerationError, RegistryError};
pub use generator::generate_example_roster;
pub use registry::{SeedDefinition, SeedRegistry};
pub use seed::{ExampleCompanySeed, ExampleRoster, ExampleUserSeed, PayCycleSeed, RoleSeed};
pub use validation::{USER_NAME_MAX, is_valid_email, is_valid_user_name};
