//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the schema
//! wrappers from [`crate::inbound::http::schemas`] and the request bodies,
//! and adds the session cookie security scheme. Swagger UI serves it in
//! debug builds and `openapi-dump` prints it for tooling.

use crate::inbound::http::admin::ImportRequest;
use crate::inbound::http::auth::{LoginRequest, SignupRequest};
use crate::inbound::http::authors::{AuthorRequest, AuthorWriteBody, AuthorshipRequest};
use crate::inbound::http::books::{BookCreatedBody, BookRequest};
use crate::inbound::http::collections::{
    CollectionChangesRequest, MembershipRequest, NewCollectionRequest, ReplaceBooksRequest,
};
use crate::inbound::http::frontend::AuthorImageRequest;
use crate::inbound::http::payloads::MessageBody;
use crate::inbound::http::schemas::{
    AuthorImageUpdateSchema, AuthorPageSchema, AuthorSchema, AuthorSummarySchema,
    BackfillReportSchema, BookDetailSchema, BookPageSchema, BookSchema, CategoryCountSchema,
    CollectionPageSchema, CollectionSummarySchema, CoverCandidateSchema, CoverRefreshSchema,
    CoverSweepReportSchema, DashboardCountsSchema, ErrorCodeSchema, ErrorSchema,
    ImportReportSchema, NamedRefSchema, PageInfoSchema, ProfileStatsSchema, RoleSchema,
    SessionUserSchema, TermPageSchema, UserPageSchema, UserProfileSchema, UserSchema,
};
use crate::inbound::http::taxonomy::TermRequest;
use crate::inbound::http::users::{NewUserRequest, UserChangesRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /auth/login or POST /auth/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the catalogue API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookshelf API",
        description = "Book catalogue with authors, categories, languages, personal collections and Open Library enrichment."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::get_book_by_title,
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::update_book,
        crate::inbound::http::books::delete_book,
        crate::inbound::http::authors::list_authors,
        crate::inbound::http::authors::search_authors,
        crate::inbound::http::authors::get_author,
        crate::inbound::http::authors::create_author,
        crate::inbound::http::authors::update_author,
        crate::inbound::http::authors::delete_author,
        crate::inbound::http::authors::add_book,
        crate::inbound::http::authors::remove_book,
        crate::inbound::http::taxonomy::list_terms,
        crate::inbound::http::taxonomy::get_term,
        crate::inbound::http::taxonomy::term_books,
        crate::inbound::http::taxonomy::create_term,
        crate::inbound::http::taxonomy::update_term,
        crate::inbound::http::taxonomy::delete_term,
        crate::inbound::http::collections::list_collections,
        crate::inbound::http::collections::get_collection,
        crate::inbound::http::collections::create_collection,
        crate::inbound::http::collections::update_collection,
        crate::inbound::http::collections::delete_collection,
        crate::inbound::http::collections::collection_books,
        crate::inbound::http::collections::add_collection_book,
        crate::inbound::http::collections::replace_collection_books,
        crate::inbound::http::collections::remove_collection_book,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::auth::profile,
        crate::inbound::http::frontend::books_by_author,
        crate::inbound::http::frontend::update_book_cover,
        crate::inbound::http::frontend::update_missing_covers,
        crate::inbound::http::frontend::update_author_image,
        crate::inbound::http::admin::dashboard,
        crate::inbound::http::admin::books_without_covers,
        crate::inbound::http::admin::backfill_covers,
        crate::inbound::http::admin::backfill_author_images,
        crate::inbound::http::admin::import_books,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::index::index,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        PageInfoSchema,
        BookSchema,
        BookDetailSchema,
        BookPageSchema,
        AuthorSchema,
        AuthorSummarySchema,
        AuthorPageSchema,
        NamedRefSchema,
        TermPageSchema,
        CollectionSummarySchema,
        CollectionPageSchema,
        RoleSchema,
        UserSchema,
        UserPageSchema,
        SessionUserSchema,
        ProfileStatsSchema,
        UserProfileSchema,
        CategoryCountSchema,
        DashboardCountsSchema,
        CoverCandidateSchema,
        BackfillReportSchema,
        ImportReportSchema,
        CoverRefreshSchema,
        CoverSweepReportSchema,
        AuthorImageUpdateSchema,
        MessageBody,
        BookRequest,
        BookCreatedBody,
        AuthorRequest,
        AuthorWriteBody,
        AuthorshipRequest,
        TermRequest,
        NewCollectionRequest,
        CollectionChangesRequest,
        MembershipRequest,
        ReplaceBooksRequest,
        NewUserRequest,
        UserChangesRequest,
        LoginRequest,
        SignupRequest,
        AuthorImageRequest,
        ImportRequest,
    )),
    tags(
        (name = "books", description = "Book catalogue"),
        (name = "authors", description = "Authors and authorship links"),
        (name = "taxonomy", description = "Categories and languages"),
        (name = "collections", description = "Personal reading lists"),
        (name = "users", description = "Account administration"),
        (name = "auth", description = "Session login and signup"),
        (name = "frontend", description = "Browser helpers and cover refresh"),
        (name = "admin", description = "Dashboard and Open Library maintenance"),
        (name = "health", description = "Probes and landing text")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SCHEMA_NAME: &str = "crate.domain.User";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, "code")]
    #[case(ERROR_SCHEMA_NAME, "message")]
    #[case(USER_SCHEMA_NAME, "username")]
    #[case(USER_SCHEMA_NAME, "role")]
    fn schemas_expose_documented_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert_object_schema_has_field(schemas.get(schema).expect("schema registered"), field);
    }

    #[rstest]
    #[case("/api/books")]
    #[case("/api/books/{id}")]
    #[case("/api/authors/search")]
    #[case("/api/{taxonomy}/{id}/books")]
    #[case("/api/collections/{id}/books/{book_id}")]
    #[case("/api/admin/import")]
    #[case("/auth/logout")]
    #[case("/health/ready")]
    #[case("/")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_present() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
