//! Domain ports for the hexagonal boundary.
//!
//! Each port exposes a strongly typed error enum so adapters map their
//! failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_change_feed;
mod company_directory;
mod pay_cycle_store;

#[cfg(test)]
pub use assignment_change_feed::MockAssignmentChangeFeed;
pub use assignment_change_feed::{
    AssignmentChangeFeed, ChangeFeedError, ChangeListener, FixtureAssignmentChangeFeed,
    Subscription,
};
#[cfg(test)]
pub use company_directory::MockCompanyDirectory;
pub use company_directory::{CompanyDirectory, CompanyDirectoryError, FixtureCompanyDirectory};
#[cfg(test)]
pub use pay_cycle_store::MockPayCycleStore;
pub use pay_cycle_store::{PayCycleStore, PayCycleStoreError};
