//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed catalogue entities used by the API and
//! persistence layers, the validation and normalisation applied before they
//! are stored, and the services behind the driving ports. Keep types
//! transport agnostic; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Book, Author, Term, Collection, User: catalogue records.
//! - SessionUser: identity stored in the session cookie.
//! - UserAccounts, OpenLibraryEnrichment: driving port implementations.

pub mod access;
pub mod account_service;
pub mod author;
pub mod auth;
pub mod book;
pub mod collection;
pub mod enrichment;
pub mod enrichment_service;
pub mod error;
pub mod ids;
pub mod ports;
pub mod profile;
pub mod resource;
pub mod seeding;
pub mod taxonomy;
pub mod text;
pub mod trace_id;
pub mod user;

pub use self::access::{SessionUser, can_act_for, can_edit_collection};
pub use self::account_service::{INVALID_CREDENTIALS, UserAccounts};
pub use self::auth::{
    AccountForm, AccountValidationError, LoginCredentials, LoginValidationError, PASSWORD_MIN_LEN,
    PasswordHash,
};
pub use self::author::{
    Author, AuthorRef, AuthorSummary, AuthorValidationError, AuthorshipChange, author_name,
};
pub use self::book::{
    Book, BookChanges, BookDetail, BookFilter, BookValidationError, Links, NewBook, book_title,
};
pub use self::collection::{
    Collection, CollectionChanges, CollectionFilter, CollectionSummary,
    CollectionValidationError, MembershipChange, NewCollection,
};
pub use self::enrichment::{
    AuthorImageUpdate, BackfillReport, CoverCandidate, CoverRefresh, CoverSweepReport, CoverUrls,
    ImportReport,
};
pub use self::enrichment_service::OpenLibraryEnrichment;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{AuthorId, BookId, CollectionId, TermId, UserId};
pub use self::profile::{CategoryCount, DashboardCounts, ProfileStats, UserProfile};
pub use self::resource::Resource;
pub use self::seeding::{CatalogueSeeder, SeedPlan, SeedReport};
pub use self::taxonomy::{TaxonomyKind, Term, term_name};
pub use self::trace_id::TraceId;
pub use self::user::{NewUser, Role, RoleParseError, User, UserAccount, UserChanges};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use bookshelf::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
