//! Shared helpers for Diesel repository implementations.
//!
//! This module provides common utilities for database access including:
//! - Error mapping from pool and Diesel errors to [`RepositoryError`]
//! - A transaction error that carries domain failures out of a closure
//! - Search pattern escaping and page assembly

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use pagination::{Page, PageRequest};
use tracing::{debug, warn};

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Resource named by a foreign key constraint, e.g. `book_authors_author_id_fkey`.
fn referenced_resource(constraint: &str) -> Option<&'static str> {
    const COLUMNS: &[(&str, &str)] = &[
        ("author_id", "Author"),
        ("category_id", "Category"),
        ("language_id", "Language"),
        ("collection_id", "Collection"),
        ("user_id", "User"),
        ("book_id", "Book"),
    ];
    COLUMNS
        .iter()
        .find(|(column, _)| constraint.contains(column))
        .map(|(_, resource)| *resource)
}

/// Map Diesel errors to repository errors.
pub fn map_diesel_error(error: DieselError) -> RepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => RepositoryError::duplicate(
                info.constraint_name().unwrap_or("unique constraint").to_owned(),
            ),
            DatabaseErrorKind::ForeignKeyViolation => {
                let constraint = info.constraint_name().unwrap_or_default();
                match referenced_resource(constraint) {
                    Some(resource) => RepositoryError::missing_reference(resource),
                    None => {
                        warn!(
                            message = info.message(),
                            constraint,
                            "unrecognised foreign key violation"
                        );
                        RepositoryError::query("foreign key violation")
                    }
                }
            }
            DatabaseErrorKind::ClosedConnection => {
                RepositoryError::connection("database connection error")
            }
            _ => RepositoryError::query("database error"),
        },
        _ => RepositoryError::query("database error"),
    }
}

/// Failure inside a transaction closure.
///
/// Diesel requires the closure error to absorb `diesel::result::Error`; the
/// `Repository` arm lets a closure abort with a domain outcome (a clash, a
/// missing reference) and still roll back.
#[derive(Debug)]
pub enum TxError {
    Diesel(DieselError),
    Repository(RepositoryError),
}

impl From<DieselError> for TxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<RepositoryError> for TxError {
    fn from(error: RepositoryError) -> Self {
        Self::Repository(error)
    }
}

impl From<TxError> for RepositoryError {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(error) => map_diesel_error(error),
            TxError::Repository(error) => error,
        }
    }
}

/// `%term%` with LIKE metacharacters escaped, lowercased for `lower(col) LIKE`.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Wrap a loaded slice and its total row count in a page envelope.
pub fn page_of<T>(data: Vec<T>, request: PageRequest, total: i64) -> Page<T> {
    Page::new(data, request, u64::try_from(total).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for persistence error mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, RepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, RepositoryError::Query { .. }));
        assert!(err.to_string().contains("record not found"));
    }

    #[rstest]
    #[case("book_authors_author_id_fkey", Some("Author"))]
    #[case("book_categories_category_id_fkey", Some("Category"))]
    #[case("collection_books_book_id_fkey", Some("Book"))]
    #[case("collections_user_id_fkey", Some("User"))]
    #[case("mystery_fkey", None)]
    fn constraints_name_their_resource(#[case] constraint: &str, #[case] expected: Option<&str>) {
        assert_eq!(referenced_resource(constraint), expected);
    }

    #[rstest]
    #[case("dune", "%dune%")]
    #[case(" 100% Pure_Fiction ", "%100\\% pure\\_fiction%")]
    fn search_patterns_escape_wildcards(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(term), expected);
    }

    #[rstest]
    fn transaction_errors_unwrap_domain_failures() {
        let err = RepositoryError::from(TxError::from(RepositoryError::conflict(4)));
        assert_eq!(err, RepositoryError::conflict(4));
    }

    #[rstest]
    fn pages_clamp_negative_totals() {
        let page = page_of(Vec::<i32>::new(), PageRequest::default(), -1);
        assert_eq!(page.pagination.total, 0);
    }
}
