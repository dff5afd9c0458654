//! PostgreSQL-backed aggregate queries for dashboards and profiles.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, StatsQuery};
use crate::domain::{CategoryCount, DashboardCounts, ProfileStats, UserId};
use crate::domain::profile::FAVORITE_CATEGORY_LIMIT;

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::pool::DbPool;

/// Diesel-backed implementation of the `StatsQuery` port.
#[derive(Clone)]
pub struct DieselStatsQuery {
    pool: DbPool,
}

impl DieselStatsQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(QueryableByName)]
struct DashboardRow {
    #[diesel(sql_type = BigInt)]
    books: i64,
    #[diesel(sql_type = BigInt)]
    authors: i64,
    #[diesel(sql_type = BigInt)]
    categories: i64,
    #[diesel(sql_type = BigInt)]
    languages: i64,
    #[diesel(sql_type = BigInt)]
    users: i64,
    #[diesel(sql_type = BigInt)]
    collections: i64,
    #[diesel(sql_type = BigInt)]
    books_without_covers: i64,
}

const DASHBOARD_SQL: &str = r"
SELECT (SELECT COUNT(*) FROM books) AS books,
       (SELECT COUNT(*) FROM authors) AS authors,
       (SELECT COUNT(*) FROM categories) AS categories,
       (SELECT COUNT(*) FROM languages) AS languages,
       (SELECT COUNT(*) FROM users) AS users,
       (SELECT COUNT(*) FROM collections) AS collections,
       (SELECT COUNT(*) FROM books WHERE cover_id IS NULL OR cover_id = '') AS books_without_covers
";

#[derive(QueryableByName)]
struct CollectionTotalsRow {
    #[diesel(sql_type = BigInt)]
    collection_count: i64,
    #[diesel(sql_type = BigInt)]
    total_books: i64,
}

const COLLECTION_TOTALS_SQL: &str = r"
SELECT COUNT(DISTINCT c.id) AS collection_count,
       COUNT(cb.book_id) AS total_books
FROM collections c
LEFT JOIN collection_books cb ON cb.collection_id = c.id
WHERE c.user_id = $1
";

#[derive(QueryableByName)]
struct CategoryCountRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    book_count: i64,
}

const FAVORITE_CATEGORIES_SQL: &str = r"
SELECT cat.name, COUNT(DISTINCT cb.book_id) AS book_count
FROM collections c
JOIN collection_books cb ON cb.collection_id = c.id
JOIN book_categories bc ON bc.book_id = cb.book_id
JOIN categories cat ON cat.id = bc.category_id
WHERE c.user_id = $1
GROUP BY cat.name
ORDER BY book_count DESC, cat.name
";

#[async_trait]
impl StatsQuery for DieselStatsQuery {
    async fn dashboard(&self) -> Result<DashboardCounts, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: DashboardRow = diesel::sql_query(DASHBOARD_SQL)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(DashboardCounts {
            books: row.books,
            authors: row.authors,
            categories: row.categories,
            languages: row.languages,
            users: row.users,
            collections: row.collections,
            books_without_covers: row.books_without_covers,
        })
    }

    async fn profile_stats(&self, user: UserId) -> Result<ProfileStats, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let totals: CollectionTotalsRow = diesel::sql_query(COLLECTION_TOTALS_SQL)
            .bind::<Integer, _>(user.get())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let categories: Vec<CategoryCountRow> = diesel::sql_query(FAVORITE_CATEGORIES_SQL)
            .bind::<Integer, _>(user.get())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let unique_categories = i64::try_from(categories.len()).unwrap_or(i64::MAX);
        Ok(ProfileStats {
            collection_count: totals.collection_count,
            total_books_in_collections: totals.total_books,
            unique_categories,
            favorite_categories: categories
                .into_iter()
                .take(FAVORITE_CATEGORY_LIMIT)
                .map(|row| CategoryCount {
                    name: row.name,
                    book_count: row.book_count,
                })
                .collect(),
        })
    }
}
