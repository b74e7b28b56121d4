//! PostgreSQL-backed `CompanyDirectory`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::Company;
use crate::domain::ports::{CompanyDirectory, CompanyDirectoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::CompanyRow;
use super::pool::DbPool;
use super::schema::companies;

#[derive(Clone)]
pub struct DieselCompanyDirectory {
    pool: DbPool,
}

impl DieselCompanyDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyDirectory for DieselCompanyDirectory {
    async fn list_companies(&self) -> Result<Vec<Company>, CompanyDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CompanyDirectoryError::connection))?;
        let rows: Vec<CompanyRow> = companies::table
            .order((companies::name.asc(), companies::id.asc()))
            .select(CompanyRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    CompanyDirectoryError::query,
                    CompanyDirectoryError::connection,
                )
            })?;
        Ok(rows.into_iter().map(Company::from).collect())
    }
}
