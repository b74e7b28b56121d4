//! Port listing the companies an administrator can switch between.

use async_trait::async_trait;

use crate::domain::Company;

use super::define_port_error;

define_port_error! {
    /// Errors raised by company directory adapters.
    pub enum CompanyDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } => "company directory connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "company directory query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    /// All companies ordered by name.
    async fn list_companies(&self) -> Result<Vec<Company>, CompanyDirectoryError>;
}

/// Directory with no companies, used when no persistence is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCompanyDirectory;

#[async_trait]
impl CompanyDirectory for FixtureCompanyDirectory {
    async fn list_companies(&self) -> Result<Vec<Company>, CompanyDirectoryError> {
        Ok(Vec::new())
    }
}
