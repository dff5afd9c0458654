//! PostgreSQL-backed `AuthorRepository` implementation using Diesel ORM.
//!
//! Listings aggregate each author's book titles in SQL so a page costs one
//! round trip. Name clashes are detected before writing so the conflict can
//! name the existing author.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Array, BigInt, Integer, Nullable, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{AuthorRepository, RepositoryError};
use crate::domain::{Author, AuthorId, AuthorSummary, AuthorshipChange, BookId};

use super::diesel_helpers::{contains_pattern, map_diesel_error, map_pool_error, page_of};
use super::models::{AuthorRow, BookAuthorRow};
use super::pool::DbPool;
use super::schema::{authors, book_authors, books};

diesel::define_sql_function!(fn lower(x: Text) -> Text);

/// Diesel-backed implementation of the `AuthorRepository` port.
#[derive(Clone)]
pub struct DieselAuthorRepository {
    pool: DbPool,
}

impl DieselAuthorRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(QueryableByName)]
struct AuthorSummaryRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Nullable<Text>)]
    image_url: Option<String>,
    #[diesel(sql_type = BigInt)]
    book_count: i64,
    #[diesel(sql_type = Array<Text>)]
    book_titles: Vec<String>,
}

impl From<AuthorSummaryRow> for AuthorSummary {
    fn from(row: AuthorSummaryRow) -> Self {
        Self {
            author: Author {
                id: AuthorId::new(row.id),
                name: row.name,
                image_url: row.image_url,
            },
            book_count: row.book_count,
            book_titles: row.book_titles,
        }
    }
}

fn summary_sql(condition: &str, tail: &str) -> String {
    format!(
        r"
SELECT a.id, a.name, a.image_url,
       COUNT(b.id) AS book_count,
       COALESCE(ARRAY_AGG(b.title::text ORDER BY b.title) FILTER (WHERE b.id IS NOT NULL), '{{}}') AS book_titles
FROM authors a
LEFT JOIN book_authors ba ON ba.author_id = a.id
LEFT JOIN books b ON b.id = ba.book_id
WHERE {condition}
GROUP BY a.id
ORDER BY a.id
{tail}
"
    )
}

async fn name_clash(
    conn: &mut AsyncPgConnection,
    name: &str,
    except: Option<i32>,
) -> Result<Option<i32>, RepositoryError> {
    let mut query = authors::table
        .select(authors::id)
        .filter(lower(authors::name).eq(name.to_lowercase()))
        .into_boxed();
    if let Some(id) = except {
        query = query.filter(authors::id.ne(id));
    }
    query
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)
}

async fn exists(
    conn: &mut AsyncPgConnection,
    author: AuthorId,
    book: BookId,
) -> Result<Option<AuthorshipChange>, RepositoryError> {
    let author_found: Option<i32> = authors::table
        .find(author.get())
        .select(authors::id)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    if author_found.is_none() {
        return Ok(Some(AuthorshipChange::AuthorMissing));
    }
    let book_found: Option<i32> = books::table
        .find(book.get())
        .select(books::id)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    Ok(book_found.is_none().then_some(AuthorshipChange::BookMissing))
}

#[async_trait]
impl AuthorRepository for DieselAuthorRepository {
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<AuthorSummary>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = search.as_deref().map(contains_pattern);

        let mut count = authors::table.into_boxed();
        if let Some(pattern) = pattern.clone() {
            count = count.filter(lower(authors::name).like(pattern));
        }
        let total: i64 = count
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<AuthorSummaryRow> = diesel::sql_query(summary_sql(
            "($1::text IS NULL OR lower(a.name) LIKE $1)",
            "LIMIT $2 OFFSET $3",
        ))
        .bind::<Nullable<Text>, _>(pattern)
        .bind::<BigInt, _>(page.limit())
        .bind::<BigInt, _>(page.offset())
        .load(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(page_of(
            rows.into_iter().map(AuthorSummary::from).collect(),
            page,
            total,
        ))
    }

    async fn find(&self, id: AuthorId) -> Result<Option<AuthorSummary>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AuthorSummaryRow> = diesel::sql_query(summary_sql("a.id = $1", ""))
            .bind::<Integer, _>(id.get())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(AuthorSummary::from))
    }

    async fn search(&self, name: &str) -> Result<Vec<Author>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AuthorRow> = authors::table
            .filter(lower(authors::name).like(contains_pattern(name)))
            .order(authors::name.asc())
            .select(AuthorRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Author::from).collect())
    }

    async fn create(&self, name: &str) -> Result<Author, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if let Some(existing) = name_clash(&mut conn, name, None).await? {
            return Err(RepositoryError::conflict(existing));
        }
        let row: AuthorRow = diesel::insert_into(authors::table)
            .values(authors::name.eq(name))
            .returning(AuthorRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn rename(&self, id: AuthorId, name: &str) -> Result<Option<Author>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if let Some(existing) = name_clash(&mut conn, name, Some(id.get())).await? {
            return Err(RepositoryError::conflict(existing));
        }
        let row: Option<AuthorRow> = diesel::update(authors::table.find(id.get()))
            .set(authors::name.eq(name))
            .returning(AuthorRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Author::from))
    }

    async fn delete(&self, id: AuthorId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(authors::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn link_book(
        &self,
        author: AuthorId,
        book: BookId,
    ) -> Result<AuthorshipChange, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if let Some(missing) = exists(&mut conn, author, book).await? {
            return Ok(missing);
        }
        diesel::insert_into(book_authors::table)
            .values(BookAuthorRow {
                book_id: book.get(),
                author_id: author.get(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(AuthorshipChange::Applied)
    }

    async fn unlink_book(
        &self,
        author: AuthorId,
        book: BookId,
    ) -> Result<AuthorshipChange, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if let Some(missing) = exists(&mut conn, author, book).await? {
            return Ok(missing);
        }
        diesel::delete(
            book_authors::table
                .filter(book_authors::author_id.eq(author.get()))
                .filter(book_authors::book_id.eq(book.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(AuthorshipChange::Applied)
    }

    async fn set_image_url(
        &self,
        id: AuthorId,
        image_url: &str,
    ) -> Result<Option<Author>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AuthorRow> = diesel::update(authors::table.find(id.get()))
            .set(authors::image_url.eq(image_url))
            .returning(AuthorRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Author::from))
    }

    async fn missing_images(&self) -> Result<Vec<Author>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AuthorRow> = diesel::sql_query(
            r"
SELECT a.id, a.name, a.image_url
FROM authors a
LEFT JOIN book_authors ba ON ba.author_id = a.id
WHERE a.image_url IS NULL OR a.image_url = ''
GROUP BY a.id
ORDER BY COUNT(ba.book_id) DESC, a.name
",
        )
        .load(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Author::from).collect())
    }
}
