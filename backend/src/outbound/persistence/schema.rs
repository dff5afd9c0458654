//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Case-insensitive
//! uniqueness lives in expression indexes (`lower(name)`), which Diesel does
//! not model; repositories check for clashes explicitly.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
        /// SHA-256 hex digest.
        password_hash -> Varchar,
        /// `admin` or `user`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    books (id) {
        id -> Int4,
        title -> Varchar,
        publication_year -> Nullable<Int4>,
        open_library_id -> Nullable<Varchar>,
        cover_id -> Nullable<Varchar>,
        cover_url -> Nullable<Text>,
        isbn -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    authors (id) {
        id -> Int4,
        name -> Varchar,
        image_url -> Nullable<Text>,
    }
}

diesel::table! {
    categories (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    languages (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    /// User-owned book lists.
    collections (id) {
        id -> Int4,
        name -> Varchar,
        description -> Nullable<Text>,
        user_id -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    book_authors (book_id, author_id) {
        book_id -> Int4,
        author_id -> Int4,
    }
}

diesel::table! {
    book_categories (book_id, category_id) {
        book_id -> Int4,
        category_id -> Int4,
    }
}

diesel::table! {
    book_languages (book_id, language_id) {
        book_id -> Int4,
        language_id -> Int4,
    }
}

diesel::table! {
    collection_books (collection_id, book_id) {
        collection_id -> Int4,
        book_id -> Int4,
        added_at -> Timestamptz,
    }
}

diesel::joinable!(book_authors -> books (book_id));
diesel::joinable!(book_authors -> authors (author_id));
diesel::joinable!(book_categories -> books (book_id));
diesel::joinable!(book_categories -> categories (category_id));
diesel::joinable!(book_languages -> books (book_id));
diesel::joinable!(book_languages -> languages (language_id));
diesel::joinable!(collection_books -> books (book_id));
diesel::joinable!(collection_books -> collections (collection_id));
diesel::joinable!(collections -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    books,
    authors,
    categories,
    languages,
    collections,
    book_authors,
    book_categories,
    book_languages,
    collection_books,
);
