//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON shape of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers are only read by utoipa's derive output"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with an existing record.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Book not found")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. `{"conflicting_id": 4}`.
    details: Option<serde_json::Value>,
}

/// Page metadata returned beside every list.
#[derive(ToSchema)]
#[schema(as = pagination::PageInfo)]
pub struct PageInfoSchema {
    #[schema(example = 1)]
    page: u32,
    #[schema(example = 20)]
    per_page: u32,
    #[schema(example = 42)]
    total: u64,
    #[schema(example = 3)]
    pages: u64,
    has_prev: bool,
    has_next: bool,
}

macro_rules! page_schema {
    ($name:ident, $item:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(ToSchema)]
        pub struct $name {
            data: Vec<$item>,
            pagination: PageInfoSchema,
        }
    };
}

page_schema!(BookPageSchema, BookDetailSchema, "Page of books.");
page_schema!(AuthorPageSchema, AuthorSummarySchema, "Page of authors.");
page_schema!(TermPageSchema, NamedRefSchema, "Page of categories or languages.");
page_schema!(CollectionPageSchema, CollectionSummarySchema, "Page of collections.");
page_schema!(UserPageSchema, UserSchema, "Page of users.");

/// Catalogue book with its related names.
#[derive(ToSchema)]
#[schema(as = crate::domain::BookDetail)]
pub struct BookDetailSchema {
    #[schema(example = 12)]
    id: i32,
    #[schema(example = "the hobbit")]
    title: String,
    #[schema(example = 1937)]
    publication_year: Option<i32>,
    #[schema(example = "OL27482W")]
    open_library_id: Option<String>,
    cover_id: Option<String>,
    cover_url: Option<String>,
    isbn: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    authors: Vec<NamedRefSchema>,
    categories: Vec<NamedRefSchema>,
    languages: Vec<NamedRefSchema>,
}

/// Bare book row.
#[derive(ToSchema)]
#[schema(as = crate::domain::Book)]
pub struct BookSchema {
    id: i32,
    title: String,
    publication_year: Option<i32>,
    open_library_id: Option<String>,
    cover_id: Option<String>,
    cover_url: Option<String>,
    isbn: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// `{id, name}` pair used for authors, categories and languages.
#[derive(ToSchema)]
#[schema(as = crate::domain::Term)]
pub struct NamedRefSchema {
    #[schema(example = 3)]
    id: i32,
    #[schema(example = "fantasy")]
    name: String,
}

/// Author with book statistics.
#[derive(ToSchema)]
#[schema(as = crate::domain::AuthorSummary)]
pub struct AuthorSummarySchema {
    id: i32,
    #[schema(example = "j.r.r. tolkien")]
    name: String,
    image_url: Option<String>,
    book_count: i64,
    book_titles: Vec<String>,
}

/// Bare author row.
#[derive(ToSchema)]
#[schema(as = crate::domain::Author)]
pub struct AuthorSchema {
    id: i32,
    name: String,
    image_url: Option<String>,
}

/// Collection with owner name and size.
#[derive(ToSchema)]
#[schema(as = crate::domain::CollectionSummary)]
pub struct CollectionSummarySchema {
    id: i32,
    #[schema(example = "summer reading")]
    name: String,
    description: Option<String>,
    user_id: i32,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(example = "bob_bookworm")]
    owner_username: String,
    book_count: i64,
}

/// Account role.
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    #[schema(rename = "admin")]
    Admin,
    #[schema(rename = "user")]
    User,
}

/// User without credentials.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
pub struct UserSchema {
    id: i32,
    #[schema(example = "alice_reader")]
    username: String,
    #[schema(example = "alice@example.com")]
    email: String,
    role: RoleSchema,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// Identity stored in the session cookie.
#[derive(ToSchema)]
#[schema(as = crate::domain::SessionUser)]
pub struct SessionUserSchema {
    id: i32,
    username: String,
    email: String,
    role: RoleSchema,
}

/// Profile statistics.
#[derive(ToSchema)]
#[schema(as = crate::domain::ProfileStats)]
pub struct ProfileStatsSchema {
    collection_count: i64,
    total_books_in_collections: i64,
    unique_categories: i64,
    favorite_categories: Vec<CategoryCountSchema>,
}

/// Account data merged with its reading statistics.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserProfile)]
pub struct UserProfileSchema {
    id: i32,
    username: String,
    email: String,
    role: RoleSchema,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    collection_count: i64,
    total_books_in_collections: i64,
    unique_categories: i64,
    favorite_categories: Vec<CategoryCountSchema>,
}

/// Category with the number of collected books in it.
#[derive(ToSchema)]
#[schema(as = crate::domain::CategoryCount)]
pub struct CategoryCountSchema {
    name: String,
    book_count: i64,
}

/// Admin dashboard totals.
#[derive(ToSchema)]
#[schema(as = crate::domain::DashboardCounts)]
pub struct DashboardCountsSchema {
    books: i64,
    authors: i64,
    categories: i64,
    languages: i64,
    users: i64,
    collections: i64,
    books_without_covers: i64,
}

/// Book lacking cover data.
#[derive(ToSchema)]
#[schema(as = crate::domain::CoverCandidate)]
pub struct CoverCandidateSchema {
    id: i32,
    title: String,
    publication_year: Option<i32>,
    open_library_id: Option<String>,
    isbn: Option<String>,
    authors: Vec<String>,
    categories: Vec<String>,
}

/// Tally of a backfill sweep.
#[derive(ToSchema)]
#[schema(as = crate::domain::BackfillReport)]
pub struct BackfillReportSchema {
    processed: u32,
    updated: u32,
    not_found: u32,
    errors: u32,
}

/// Tally of a search-driven import.
#[derive(ToSchema)]
#[schema(as = crate::domain::ImportReport)]
pub struct ImportReportSchema {
    searched: u32,
    imported: u32,
    duplicates: u32,
    errors: u32,
    books: Vec<i32>,
}

/// Outcome of refreshing one cover.
#[derive(ToSchema)]
#[schema(as = crate::domain::CoverRefresh)]
pub struct CoverRefreshSchema {
    success: bool,
    #[schema(example = "Cover updated successfully")]
    message: String,
    cover_url: Option<String>,
}

/// Outcome of refreshing every missing cover URL.
#[derive(ToSchema)]
#[schema(as = crate::domain::CoverSweepReport)]
pub struct CoverSweepReportSchema {
    success: bool,
    message: String,
    total_count: u32,
    updated_count: u32,
}

/// Outcome of setting an author image.
#[derive(ToSchema)]
#[schema(as = crate::domain::AuthorImageUpdate)]
pub struct AuthorImageUpdateSchema {
    success: bool,
    message: String,
    image_url: String,
}
