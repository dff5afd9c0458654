//! Junction-table synchronisation for book relations.
//!
//! Authors, categories and languages share one shape: a `name` table and a
//! `book_<x>` junction keyed by `(book_id, <x>_id)`. Linking resolves names
//! (find or create), validates ids, and inserts junction rows; replacing
//! deletes every existing row first. Callers run these inside a transaction.

use diesel::{OptionalExtension, sql_query};
use diesel::sql_types::{Array, Integer, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::RepositoryError;

use super::diesel_helpers::TxError;

/// A book relation backed by a name table and a junction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Authors,
    Categories,
    Languages,
}

impl Relation {
    const fn table(self) -> &'static str {
        match self {
            Self::Authors => "authors",
            Self::Categories => "categories",
            Self::Languages => "languages",
        }
    }

    const fn junction(self) -> &'static str {
        match self {
            Self::Authors => "book_authors",
            Self::Categories => "book_categories",
            Self::Languages => "book_languages",
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::Authors => "author_id",
            Self::Categories => "category_id",
            Self::Languages => "language_id",
        }
    }

    const fn resource(self) -> &'static str {
        match self {
            Self::Authors => "Author",
            Self::Categories => "Category",
            Self::Languages => "Language",
        }
    }
}

#[derive(diesel::QueryableByName)]
struct IdRow {
    #[diesel(sql_type = Integer)]
    id: i32,
}

/// Id of the row named `name`, inserting it when absent.
pub async fn find_or_create(
    conn: &mut AsyncPgConnection,
    relation: Relation,
    name: &str,
) -> Result<i32, TxError> {
    let table = relation.table();
    let existing: Option<IdRow> = sql_query(format!(
        "SELECT id FROM {table} WHERE lower(name) = lower($1) LIMIT 1"
    ))
    .bind::<Text, _>(name)
    .get_result(conn)
    .await
    .optional()?;
    if let Some(row) = existing {
        return Ok(row.id);
    }
    let inserted: IdRow = sql_query(format!("INSERT INTO {table} (name) VALUES ($1) RETURNING id"))
        .bind::<Text, _>(name)
        .get_result(conn)
        .await?;
    Ok(inserted.id)
}

async fn ensure_ids_exist(
    conn: &mut AsyncPgConnection,
    relation: Relation,
    ids: &[i32],
) -> Result<(), TxError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<IdRow> = sql_query(format!(
        "SELECT id FROM {} WHERE id = ANY($1)",
        relation.table()
    ))
    .bind::<Array<Integer>, _>(ids)
    .load(conn)
    .await?;
    if found.len() == ids.len() {
        Ok(())
    } else {
        Err(RepositoryError::missing_reference(relation.resource()).into())
    }
}

/// Link a book to existing ids and to names found or created on the fly.
pub async fn link(
    conn: &mut AsyncPgConnection,
    book_id: i32,
    relation: Relation,
    ids: &[i32],
    names: &[String],
) -> Result<(), TxError> {
    let mut wanted: Vec<i32> = ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();
    ensure_ids_exist(conn, relation, &wanted).await?;
    for name in names {
        wanted.push(find_or_create(conn, relation, name).await?);
    }
    wanted.sort_unstable();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(());
    }
    sql_query(format!(
        "INSERT INTO {} (book_id, {}) SELECT $1, unnest($2) ON CONFLICT DO NOTHING",
        relation.junction(),
        relation.column()
    ))
    .bind::<Integer, _>(book_id)
    .bind::<Array<Integer>, _>(&wanted)
    .execute(conn)
    .await?;
    Ok(())
}

/// Delete every link of this kind, then link afresh.
pub async fn replace(
    conn: &mut AsyncPgConnection,
    book_id: i32,
    relation: Relation,
    ids: &[i32],
    names: &[String],
) -> Result<(), TxError> {
    sql_query(format!(
        "DELETE FROM {} WHERE book_id = $1",
        relation.junction()
    ))
    .bind::<Integer, _>(book_id)
    .execute(conn)
    .await?;
    link(conn, book_id, relation, ids, names).await
}
