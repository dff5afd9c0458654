//! PostgreSQL-backed `BookRepository` implementation using Diesel ORM.
//!
//! Listing builds a boxed query from the optional filters. Writes run in one
//! transaction: the case-insensitive title clash is checked first so the
//! conflict can name the existing row, then the book row is written and each
//! relation is synchronised through its junction table.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Array, BigInt, Integer, Nullable, Text};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{BookRepository, RepositoryError};
use crate::domain::{
    AuthorRef, Book, BookChanges, BookDetail, BookFilter, BookId, CoverCandidate, Links, NewBook,
    Term, TermId,
};

use super::diesel_helpers::{TxError, contains_pattern, map_diesel_error, map_pool_error, page_of};
use super::diesel_relation_sync::{Relation, link, replace};
use super::models::{BookRow, BookUpdate, NewBookRow};
use super::pool::DbPool;
use super::schema::{
    authors, book_authors, book_categories, book_languages, books, categories, collection_books,
    languages,
};

diesel::define_sql_function!(fn lower(x: Text) -> Text);

/// Diesel-backed implementation of the `BookRepository` port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn raw_ids<Id: Copy + Into<i32>>(links: &Links<Id>) -> Vec<i32> {
    links.ids.iter().map(|id| (*id).into()).collect()
}

fn filtered(filter: &BookFilter) -> books::BoxedQuery<'static, Pg> {
    let mut query = books::table.into_boxed();
    if let Some(search) = filter.search.as_deref() {
        query = query.filter(lower(books::title).like(contains_pattern(search)));
    }
    if filter.no_cover {
        query = query.filter(
            books::cover_id
                .is_null()
                .or(books::cover_id.assume_not_null().eq("")),
        );
    }
    if let Some(author) = filter.author_id {
        query = query.filter(
            books::id.eq_any(
                book_authors::table
                    .filter(book_authors::author_id.eq(author.get()))
                    .select(book_authors::book_id),
            ),
        );
    }
    if let Some(category) = filter.category_id {
        query = query.filter(
            books::id.eq_any(
                book_categories::table
                    .filter(book_categories::category_id.eq(category.get()))
                    .select(book_categories::book_id),
            ),
        );
    }
    if let Some(language) = filter.language_id {
        query = query.filter(
            books::id.eq_any(
                book_languages::table
                    .filter(book_languages::language_id.eq(language.get()))
                    .select(book_languages::book_id),
            ),
        );
    }
    if let Some(collection) = filter.collection_id {
        query = query.filter(
            books::id.eq_any(
                collection_books::table
                    .filter(collection_books::collection_id.eq(collection.get()))
                    .select(collection_books::book_id),
            ),
        );
    }
    query
}

fn group_terms(rows: Vec<(i32, i32, String)>) -> HashMap<i32, Vec<Term>> {
    let mut grouped: HashMap<i32, Vec<Term>> = HashMap::new();
    for (book_id, id, name) in rows {
        grouped.entry(book_id).or_default().push(Term {
            id: TermId::new(id),
            name,
        });
    }
    grouped
}

/// Attach authors, categories and languages to loaded rows, keeping order.
async fn load_details(
    conn: &mut AsyncPgConnection,
    rows: Vec<BookRow>,
) -> QueryResult<Vec<BookDetail>> {
    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let author_rows: Vec<(i32, i32, String)> = book_authors::table
        .inner_join(authors::table)
        .filter(book_authors::book_id.eq_any(&ids))
        .select((book_authors::book_id, authors::id, authors::name))
        .order(authors::name.asc())
        .load(conn)
        .await?;
    let category_rows: Vec<(i32, i32, String)> = book_categories::table
        .inner_join(categories::table)
        .filter(book_categories::book_id.eq_any(&ids))
        .select((book_categories::book_id, categories::id, categories::name))
        .order(categories::name.asc())
        .load(conn)
        .await?;
    let language_rows: Vec<(i32, i32, String)> = book_languages::table
        .inner_join(languages::table)
        .filter(book_languages::book_id.eq_any(&ids))
        .select((book_languages::book_id, languages::id, languages::name))
        .order(languages::name.asc())
        .load(conn)
        .await?;

    let mut authors_by_book = HashMap::<i32, Vec<AuthorRef>>::new();
    for (book_id, id, name) in author_rows {
        authors_by_book.entry(book_id).or_default().push(AuthorRef {
            id: id.into(),
            name,
        });
    }
    let mut categories_by_book = group_terms(category_rows);
    let mut languages_by_book = group_terms(language_rows);

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            BookDetail {
                book: Book::from(row),
                authors: authors_by_book.remove(&id).unwrap_or_default(),
                categories: categories_by_book.remove(&id).unwrap_or_default(),
                languages: languages_by_book.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

/// Id of another book already using `title`, compared case-insensitively.
async fn title_clash(
    conn: &mut AsyncPgConnection,
    title: &str,
    except: Option<i32>,
) -> QueryResult<Option<i32>> {
    let mut query = books::table
        .select(books::id)
        .filter(lower(books::title).eq(title.to_lowercase()))
        .into_boxed();
    if let Some(id) = except {
        query = query.filter(books::id.ne(id));
    }
    query.first(conn).await.optional()
}

#[derive(QueryableByName)]
struct CoverCandidateRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Text)]
    title: String,
    #[diesel(sql_type = Nullable<Integer>)]
    publication_year: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    open_library_id: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    isbn: Option<String>,
    #[diesel(sql_type = Array<Text>)]
    authors: Vec<String>,
    #[diesel(sql_type = Array<Text>)]
    categories: Vec<String>,
}

impl From<CoverCandidateRow> for CoverCandidate {
    fn from(row: CoverCandidateRow) -> Self {
        Self {
            id: BookId::new(row.id),
            title: row.title,
            publication_year: row.publication_year,
            open_library_id: row.open_library_id,
            isbn: row.isbn,
            authors: row.authors,
            categories: row.categories,
        }
    }
}

fn cover_candidates_sql(missing_column: &str, order: &str) -> String {
    format!(
        r"
SELECT b.id, b.title, b.publication_year, b.open_library_id, b.isbn,
       COALESCE(ARRAY_AGG(DISTINCT a.name::text) FILTER (WHERE a.name IS NOT NULL), '{{}}') AS authors,
       COALESCE(ARRAY_AGG(DISTINCT c.name::text) FILTER (WHERE c.name IS NOT NULL), '{{}}') AS categories
FROM books b
LEFT JOIN book_authors ba ON ba.book_id = b.id
LEFT JOIN authors a ON a.id = ba.author_id
LEFT JOIN book_categories bc ON bc.book_id = b.id
LEFT JOIN categories c ON c.id = bc.category_id
WHERE b.{missing_column} IS NULL OR b.{missing_column} = ''
GROUP BY b.id
ORDER BY {order}
LIMIT $1
"
    )
}

async fn cover_candidates(
    pool: &DbPool,
    missing_column: &str,
    order: &str,
    limit: Option<i64>,
) -> Result<Vec<CoverCandidate>, RepositoryError> {
    let mut conn = pool.get().await.map_err(map_pool_error)?;
    let rows: Vec<CoverCandidateRow> =
        diesel::sql_query(cover_candidates_sql(missing_column, order))
            .bind::<Nullable<BigInt>, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
    Ok(rows.into_iter().map(CoverCandidate::from).collect())
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn list(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> Result<Page<BookDetail>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<BookRow> = filtered(filter)
            .order(books::id.asc())
            .limit(page.limit())
            .offset(page.offset())
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let details = load_details(&mut conn, rows)
            .await
            .map_err(map_diesel_error)?;
        Ok(page_of(details, page, total))
    }

    async fn find(&self, id: BookId) -> Result<Option<BookDetail>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookRow> = books::table
            .find(id.get())
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let details = load_details(&mut conn, row.into_iter().collect())
            .await
            .map_err(map_diesel_error)?;
        Ok(details.into_iter().next())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<BookDetail>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookRow> = books::table
            .filter(lower(books::title).eq(title.to_lowercase()))
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let details = load_details(&mut conn, row.into_iter().collect())
            .await
            .map_err(map_diesel_error)?;
        Ok(details.into_iter().next())
    }

    async fn find_duplicate(&self, book: &NewBook) -> Result<Option<BookId>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = books::table
            .select(books::id)
            .filter(lower(books::title).eq(book.title.to_lowercase()))
            .into_boxed();
        if let Some(olid) = book.open_library_id.as_deref() {
            query = query.or_filter(books::open_library_id.eq(olid.to_owned()));
        }
        let found: Option<i32> = query
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(found.map(BookId::new))
    }

    async fn create(&self, book: &NewBook) -> Result<BookId, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let author_ids = raw_ids(&book.authors);
        let category_ids = raw_ids(&book.categories);
        let language_ids = raw_ids(&book.languages);

        let id = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    if let Some(existing) = title_clash(conn, &book.title, None).await? {
                        return Err(RepositoryError::conflict(existing).into());
                    }
                    let row = NewBookRow {
                        title: &book.title,
                        publication_year: book.publication_year,
                        open_library_id: book.open_library_id.as_deref(),
                        cover_id: book.cover_id.as_deref(),
                        cover_url: book.cover_url.as_deref(),
                        isbn: book.isbn.as_deref(),
                    };
                    let id: i32 = diesel::insert_into(books::table)
                        .values(&row)
                        .returning(books::id)
                        .get_result(conn)
                        .await?;
                    link(conn, id, Relation::Authors, &author_ids, &book.authors.names).await?;
                    link(
                        conn,
                        id,
                        Relation::Categories,
                        &category_ids,
                        &book.categories.names,
                    )
                    .await?;
                    link(
                        conn,
                        id,
                        Relation::Languages,
                        &language_ids,
                        &book.languages.names,
                    )
                    .await?;
                    Ok(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(RepositoryError::from)?;
        Ok(BookId::new(id))
    }

    async fn update(&self, id: BookId, changes: &BookChanges) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw_id = id.get();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let exists: Option<i32> = books::table
                    .find(raw_id)
                    .select(books::id)
                    .first(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Ok(false);
                }
                if let Some(title) = changes.title.as_deref() {
                    if let Some(existing) = title_clash(conn, title, Some(raw_id)).await? {
                        return Err(RepositoryError::conflict(existing).into());
                    }
                }
                if changes.touches_columns() {
                    diesel::update(books::table.find(raw_id))
                        .set(&BookUpdate {
                            title: changes.title.as_deref(),
                            publication_year: changes.publication_year,
                            open_library_id: changes.open_library_id.as_deref(),
                            cover_id: changes.cover_id.as_deref(),
                            cover_url: changes.cover_url.as_deref(),
                            isbn: changes.isbn.as_deref(),
                        })
                        .execute(conn)
                        .await?;
                }
                if let Some(links) = &changes.authors {
                    replace(conn, raw_id, Relation::Authors, &raw_ids(links), &links.names)
                        .await?;
                }
                if let Some(links) = &changes.categories {
                    replace(
                        conn,
                        raw_id,
                        Relation::Categories,
                        &raw_ids(links),
                        &links.names,
                    )
                    .await?;
                }
                if let Some(links) = &changes.languages {
                    replace(
                        conn,
                        raw_id,
                        Relation::Languages,
                        &raw_ids(links),
                        &links.names,
                    )
                    .await?;
                }
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(RepositoryError::from)
    }

    async fn delete(&self, id: BookId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(books::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn by_author_name(&self, name: &str) -> Result<Vec<Book>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookRow> = books::table
            .inner_join(book_authors::table.inner_join(authors::table))
            .filter(lower(authors::name).eq(name.trim().to_lowercase()))
            .order((books::publication_year.desc().nulls_last(), books::title.asc()))
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn without_cover_ids(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<CoverCandidate>, RepositoryError> {
        cover_candidates(&self.pool, "cover_id", "b.title", limit).await
    }

    async fn without_cover_urls(&self) -> Result<Vec<CoverCandidate>, RepositoryError> {
        cover_candidates(&self.pool, "cover_url", "b.id", None).await
    }

    async fn set_cover_id(&self, id: BookId, cover_id: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(books::table.find(id.get()))
            .set(books::cover_id.eq(cover_id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn set_cover_url(&self, id: BookId, cover_url: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(books::table.find(id.get()))
            .set(books::cover_url.eq(cover_url))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for query construction helpers.
    use super::*;
    use crate::domain::AuthorId;
    use rstest::rstest;

    #[rstest]
    fn filters_compose_into_one_where_clause() {
        let filter = BookFilter {
            search: Some("dune".to_owned()),
            no_cover: true,
            author_id: Some(AuthorId::new(2)),
            ..BookFilter::default()
        };
        let sql = diesel::debug_query::<Pg, _>(&filtered(&filter)).to_string();
        assert!(sql.contains("lower(\"books\".\"title\") LIKE"));
        assert!(sql.contains("\"books\".\"cover_id\" IS NULL"));
        assert!(sql.contains("\"book_authors\".\"author_id\" ="));
        assert!(!sql.contains("book_categories"));
    }

    #[rstest]
    fn cover_candidate_sql_targets_the_missing_column() {
        let sql = cover_candidates_sql("cover_url", "b.id");
        assert!(sql.contains("b.cover_url IS NULL OR b.cover_url = ''"));
        assert!(sql.contains("ORDER BY b.id"));
        assert!(sql.contains("'{}'"));
    }

    #[rstest]
    fn link_ids_are_unwrapped() {
        let links = Links {
            ids: vec![TermId::new(4), TermId::new(9)],
            names: Vec::new(),
        };
        assert_eq!(raw_ids(&links), vec![4, 9]);
    }
}
