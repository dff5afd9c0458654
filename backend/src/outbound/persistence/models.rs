//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain records live next
//! to the row they read.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Author, AuthorId, Book, BookId, Collection, CollectionId, PasswordHash, Role, User,
    UserAccount, UserId,
};

use super::schema::{
    authors, book_authors, book_categories, book_languages, books, collection_books, collections,
    users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    fn role(&self) -> Role {
        self.role.parse().unwrap_or_else(|_| {
            tracing::warn!(
                value = %self.role,
                user_id = self.id,
                "unrecognised role value, defaulting to user"
            );
            Role::User
        })
    }

    pub fn into_user(self) -> User {
        let role = self.role();
        User {
            id: UserId::new(self.id),
            username: self.username,
            email: self.email,
            role,
            created_at: self.created_at,
        }
    }

    pub fn into_account(self) -> UserAccount {
        let password_hash = PasswordHash::from_stored(self.password_hash.clone());
        UserAccount {
            user: self.into_user(),
            password_hash,
        }
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Changeset struct for partial user updates.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

/// Row struct for reading from the books table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookRow {
    pub id: i32,
    pub title: String,
    pub publication_year: Option<i32>,
    pub open_library_id: Option<String>,
    pub cover_id: Option<String>,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: BookId::new(row.id),
            title: row.title,
            publication_year: row.publication_year,
            open_library_id: row.open_library_id,
            cover_id: row.cover_id,
            cover_url: row.cover_url,
            isbn: row.isbn,
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for creating new book records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub(crate) struct NewBookRow<'a> {
    pub title: &'a str,
    pub publication_year: Option<i32>,
    pub open_library_id: Option<&'a str>,
    pub cover_id: Option<&'a str>,
    pub cover_url: Option<&'a str>,
    pub isbn: Option<&'a str>,
}

/// Changeset struct for partial book updates; `None` skips the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = books)]
pub(crate) struct BookUpdate<'a> {
    pub title: Option<&'a str>,
    pub publication_year: Option<i32>,
    pub open_library_id: Option<&'a str>,
    pub cover_id: Option<&'a str>,
    pub cover_url: Option<&'a str>,
    pub isbn: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

/// Row struct for reading from the authors table.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: i32,
    pub name: String,
    pub image_url: Option<String>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: AuthorId::new(row.id),
            name: row.name,
            image_url: row.image_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Row struct for reading from the collections table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CollectionRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Self {
            id: CollectionId::new(row.id),
            name: row.name,
            description: row.description,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for creating new collections.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = collections)]
pub(crate) struct NewCollectionRow<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub user_id: i32,
}

/// Changeset struct for partial collection updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = collections)]
pub(crate) struct CollectionUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Junction rows
// ---------------------------------------------------------------------------

/// Link between a book and an author.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = book_authors)]
pub(crate) struct BookAuthorRow {
    pub book_id: i32,
    pub author_id: i32,
}

/// Link between a book and a category.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = book_categories)]
pub(crate) struct BookCategoryRow {
    pub book_id: i32,
    pub category_id: i32,
}

/// Link between a book and a language.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = book_languages)]
pub(crate) struct BookLanguageRow {
    pub book_id: i32,
    pub language_id: i32,
}

/// Membership of a book in a collection.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = collection_books)]
pub(crate) struct CollectionBookRow {
    pub collection_id: i32,
    pub book_id: i32,
}
