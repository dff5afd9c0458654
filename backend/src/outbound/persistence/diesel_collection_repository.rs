//! PostgreSQL-backed `CollectionRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text, Timestamptz};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{CollectionRepository, RepositoryError};
use crate::domain::{
    BookId, Collection, CollectionChanges, CollectionFilter, CollectionId, CollectionSummary,
    MembershipChange, NewCollection, UserId,
};

use super::diesel_helpers::{TxError, contains_pattern, map_diesel_error, map_pool_error, page_of};
use super::models::{CollectionBookRow, CollectionUpdate, NewCollectionRow};
use super::pool::DbPool;
use super::schema::{books, collection_books, collections};

diesel::define_sql_function!(fn lower(x: Text) -> Text);

/// Diesel-backed implementation of the `CollectionRepository` port.
#[derive(Clone)]
pub struct DieselCollectionRepository {
    pool: DbPool,
}

impl DieselCollectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(QueryableByName)]
struct CollectionSummaryRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Nullable<Text>)]
    description: Option<String>,
    #[diesel(sql_type = Integer)]
    user_id: i32,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Text)]
    owner_username: String,
    #[diesel(sql_type = BigInt)]
    book_count: i64,
}

impl From<CollectionSummaryRow> for CollectionSummary {
    fn from(row: CollectionSummaryRow) -> Self {
        Self {
            collection: Collection {
                id: CollectionId::new(row.id),
                name: row.name,
                description: row.description,
                user_id: UserId::new(row.user_id),
                created_at: row.created_at,
            },
            owner_username: row.owner_username,
            book_count: row.book_count,
        }
    }
}

fn summary_sql(condition: &str, tail: &str) -> String {
    format!(
        r"
SELECT c.id, c.name, c.description, c.user_id, c.created_at,
       u.username AS owner_username,
       COUNT(cb.book_id) AS book_count
FROM collections c
JOIN users u ON u.id = c.user_id
LEFT JOIN collection_books cb ON cb.collection_id = c.id
WHERE {condition}
GROUP BY c.id, u.username
ORDER BY c.id
{tail}
"
    )
}

const FILTER_CONDITION: &str =
    "($1::integer IS NULL OR c.user_id = $1) AND ($2::text IS NULL OR lower(c.name) LIKE $2)";

fn filtered(
    owner: Option<i32>,
    pattern: Option<String>,
) -> collections::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = collections::table.into_boxed();
    if let Some(owner) = owner {
        query = query.filter(collections::user_id.eq(owner));
    }
    if let Some(pattern) = pattern {
        query = query.filter(lower(collections::name).like(pattern));
    }
    query
}

async fn collection_exists(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<bool> {
    let found: Option<i32> = collections::table
        .find(id)
        .select(collections::id)
        .first(conn)
        .await
        .optional()?;
    Ok(found.is_some())
}

async fn existing_books(conn: &mut AsyncPgConnection, ids: &[i32]) -> QueryResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let found: i64 = books::table
        .filter(books::id.eq_any(ids))
        .count()
        .get_result(conn)
        .await?;
    Ok(usize::try_from(found).unwrap_or_default())
}

#[async_trait]
impl CollectionRepository for DieselCollectionRepository {
    async fn list(
        &self,
        filter: &CollectionFilter,
        page: PageRequest,
    ) -> Result<Page<CollectionSummary>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = filter.owner.map(UserId::get);
        let pattern = filter.search.as_deref().map(contains_pattern);

        let total: i64 = filtered(owner, pattern.clone())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<CollectionSummaryRow> =
            diesel::sql_query(summary_sql(FILTER_CONDITION, "LIMIT $3 OFFSET $4"))
                .bind::<Nullable<Integer>, _>(owner)
                .bind::<Nullable<Text>, _>(pattern)
                .bind::<BigInt, _>(page.limit())
                .bind::<BigInt, _>(page.offset())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;

        Ok(page_of(
            rows.into_iter().map(CollectionSummary::from).collect(),
            page,
            total,
        ))
    }

    async fn find(&self, id: CollectionId) -> Result<Option<CollectionSummary>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CollectionSummaryRow> = diesel::sql_query(summary_sql("c.id = $1", ""))
            .bind::<Integer, _>(id.get())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(CollectionSummary::from))
    }

    async fn create(&self, collection: &NewCollection) -> Result<CollectionId, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: i32 = diesel::insert_into(collections::table)
            .values(NewCollectionRow {
                name: collection.name(),
                description: collection.description(),
                user_id: collection.owner().get(),
            })
            .returning(collections::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(CollectionId::new(id))
    }

    async fn update(
        &self,
        id: CollectionId,
        changes: &CollectionChanges,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(collections::table.find(id.get()))
            .set(&CollectionUpdate {
                name: changes.name(),
                description: changes.description(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: CollectionId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(collections::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn add_book(
        &self,
        id: CollectionId,
        book: BookId,
    ) -> Result<MembershipChange, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if !collection_exists(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)?
        {
            return Ok(MembershipChange::CollectionMissing);
        }
        if existing_books(&mut conn, &[book.get()])
            .await
            .map_err(map_diesel_error)?
            == 0
        {
            return Ok(MembershipChange::BookMissing);
        }
        diesel::insert_into(collection_books::table)
            .values(CollectionBookRow {
                collection_id: id.get(),
                book_id: book.get(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(MembershipChange::Applied)
    }

    async fn remove_book(&self, id: CollectionId, book: BookId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            collection_books::table
                .filter(collection_books::collection_id.eq(id.get()))
                .filter(collection_books::book_id.eq(book.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn replace_books(
        &self,
        id: CollectionId,
        books: &[BookId],
    ) -> Result<MembershipChange, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let collection_id = id.get();
        let mut book_ids: Vec<i32> = books.iter().map(|book| book.get()).collect();
        book_ids.sort_unstable();
        book_ids.dedup();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                if !collection_exists(conn, collection_id).await? {
                    return Ok(MembershipChange::CollectionMissing);
                }
                if existing_books(conn, &book_ids).await? != book_ids.len() {
                    return Ok(MembershipChange::BookMissing);
                }
                diesel::delete(
                    collection_books::table
                        .filter(collection_books::collection_id.eq(collection_id)),
                )
                .execute(conn)
                .await?;
                let rows: Vec<CollectionBookRow> = book_ids
                    .iter()
                    .map(|&book_id| CollectionBookRow {
                        collection_id,
                        book_id,
                    })
                    .collect();
                if !rows.is_empty() {
                    diesel::insert_into(collection_books::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok(MembershipChange::Applied)
            }
            .scope_boxed()
        })
        .await
        .map_err(RepositoryError::from)
    }
}
