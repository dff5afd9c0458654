//! PostgreSQL-backed `TaxonomyRepository` for the categories and languages
//! tables.
//!
//! Both tables are `(id SERIAL, name TEXT)` with a unique `lower(name)` index,
//! so one adapter bound to a [`TaxonomyKind`] serves either table.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{RepositoryError, TaxonomyRepository};
use crate::domain::{TaxonomyKind, Term, TermId};

use super::diesel_helpers::{contains_pattern, map_diesel_error, map_pool_error, page_of};
use super::pool::DbPool;

/// Diesel-backed implementation of the `TaxonomyRepository` port.
#[derive(Clone)]
pub struct DieselTaxonomyRepository {
    pool: DbPool,
    kind: TaxonomyKind,
}

impl DieselTaxonomyRepository {
    /// Repository over the `categories` table.
    pub fn categories(pool: DbPool) -> Self {
        Self {
            pool,
            kind: TaxonomyKind::Category,
        }
    }

    /// Repository over the `languages` table.
    pub fn languages(pool: DbPool) -> Self {
        Self {
            pool,
            kind: TaxonomyKind::Language,
        }
    }

    const fn table(&self) -> &'static str {
        table_for(self.kind)
    }
}

const fn table_for(kind: TaxonomyKind) -> &'static str {
    match kind {
        TaxonomyKind::Category => "categories",
        TaxonomyKind::Language => "languages",
    }
}

#[derive(diesel::QueryableByName)]
struct TermRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Text)]
    name: String,
}

impl From<TermRow> for Term {
    fn from(row: TermRow) -> Self {
        Self {
            id: TermId::new(row.id),
            name: row.name,
        }
    }
}

#[derive(diesel::QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

#[derive(diesel::QueryableByName)]
struct IdRow {
    #[diesel(sql_type = Integer)]
    id: i32,
}

const SEARCH_CONDITION: &str = "($1::text IS NULL OR lower(name) LIKE $1)";

async fn name_clash(
    conn: &mut AsyncPgConnection,
    table: &str,
    name: &str,
    except: Option<i32>,
) -> Result<Option<i32>, RepositoryError> {
    let row: Option<IdRow> = diesel::sql_query(format!(
        "SELECT id FROM {table} WHERE lower(name) = lower($1) \
         AND ($2::integer IS NULL OR id <> $2) LIMIT 1"
    ))
    .bind::<Text, _>(name)
    .bind::<Nullable<Integer>, _>(except)
    .get_result(conn)
    .await
    .optional()
    .map_err(map_diesel_error)?;
    Ok(row.map(|row| row.id))
}

#[async_trait]
impl TaxonomyRepository for DieselTaxonomyRepository {
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Term>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let table = self.table();
        let pattern = search.as_deref().map(contains_pattern);

        let count: CountRow = diesel::sql_query(format!(
            "SELECT COUNT(*) AS total FROM {table} WHERE {SEARCH_CONDITION}"
        ))
        .bind::<Nullable<Text>, _>(pattern.clone())
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        let rows: Vec<TermRow> = diesel::sql_query(format!(
            "SELECT id, name FROM {table} WHERE {SEARCH_CONDITION} \
             ORDER BY name LIMIT $2 OFFSET $3"
        ))
        .bind::<Nullable<Text>, _>(pattern)
        .bind::<BigInt, _>(page.limit())
        .bind::<BigInt, _>(page.offset())
        .load(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(page_of(
            rows.into_iter().map(Term::from).collect(),
            page,
            count.total,
        ))
    }

    async fn find(&self, id: TermId) -> Result<Option<Term>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TermRow> = diesel::sql_query(format!(
            "SELECT id, name FROM {} WHERE id = $1",
            self.table()
        ))
        .bind::<Integer, _>(id.get())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        Ok(row.map(Term::from))
    }

    async fn create(&self, name: &str) -> Result<TermId, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let table = self.table();
        if let Some(existing) = name_clash(&mut conn, table, name, None).await? {
            return Err(RepositoryError::conflict(existing));
        }
        let row: IdRow = diesel::sql_query(format!(
            "INSERT INTO {table} (name) VALUES ($1) RETURNING id"
        ))
        .bind::<Text, _>(name)
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(TermId::new(row.id))
    }

    async fn rename(&self, id: TermId, name: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let table = self.table();
        if let Some(existing) = name_clash(&mut conn, table, name, Some(id.get())).await? {
            return Err(RepositoryError::conflict(existing));
        }
        let updated = diesel::sql_query(format!("UPDATE {table} SET name = $1 WHERE id = $2"))
            .bind::<Text, _>(name)
            .bind::<Integer, _>(id.get())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: TermId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::sql_query(format!("DELETE FROM {} WHERE id = $1", self.table()))
            .bind::<Integer, _>(id.get())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
