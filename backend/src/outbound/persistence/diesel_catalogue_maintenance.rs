//! Destructive maintenance operations used by the seeding tool.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{CatalogueMaintenance, RepositoryError};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::pool::DbPool;

/// Every application table.
const TABLES: &[&str] = &[
    "collection_books",
    "book_languages",
    "book_categories",
    "book_authors",
    "collections",
    "books",
    "authors",
    "categories",
    "languages",
    "users",
];

fn truncate_sql() -> String {
    format!("TRUNCATE {} RESTART IDENTITY CASCADE", TABLES.join(", "))
}

/// Diesel-backed implementation of the `CatalogueMaintenance` port.
#[derive(Clone)]
pub struct DieselCatalogueMaintenance {
    pool: DbPool,
}

impl DieselCatalogueMaintenance {
    /// Create a new adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogueMaintenance for DieselCatalogueMaintenance {
    async fn reset(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        warn!(tables = TABLES.len(), "truncating every catalogue table");
        diesel::sql_query(truncate_sql())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
