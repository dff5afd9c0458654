//! Category and language endpoints.
//!
//! One set of handlers serves both `/api/categories` and `/api/languages`;
//! each scope carries its [`TaxonomyKind`] as app data.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::repository_error;
use crate::domain::{BookFilter, Error, Resource, TaxonomyKind, Term, TermId, term_name};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::AdminUser;
use crate::inbound::http::payloads::{ListQuery, MessageBody, page_response};
use crate::inbound::http::schemas::{BookPageSchema, ErrorSchema, NamedRefSchema, TermPageSchema};
use crate::inbound::http::state::HttpState;

/// `{name}` body for create and rename.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TermRequest {
    #[schema(example = "Science Fiction")]
    pub name: Option<String>,
}

impl TermRequest {
    fn name(&self, kind: TaxonomyKind) -> Result<String, Error> {
        term_name(self.name.as_deref())
            .ok_or_else(|| Error::invalid_request(kind.missing_name_message()))
    }
}

fn not_found(kind: TaxonomyKind) -> Error {
    Error::not_found(kind.resource().not_found_message())
}

fn message(kind: TaxonomyKind, verb: &str) -> MessageBody {
    MessageBody::new(format!("{} {verb}", kind.resource().label()))
}

/// List terms of one kind.
#[utoipa::path(
    get,
    path = "/api/{taxonomy}",
    params(
        ("taxonomy" = String, Path, description = "`categories` or `languages`"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of terms", body = TermPageSchema),
        (status = 400, description = "Invalid paging", body = ErrorSchema)
    ),
    tags = ["taxonomy"],
    operation_id = "listTerms",
    security([])
)]
#[get("")]
pub async fn list_terms(
    req: HttpRequest,
    kind: web::Data<TaxonomyKind>,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let kind = **kind;
    let page = query.page_request()?;
    let terms = state
        .taxonomy(kind)
        .list(query.search(), page)
        .await
        .map_err(repository_error(kind.resource()))?;
    Ok(page_response(&req, &terms))
}

/// Fetch one term.
#[utoipa::path(
    get,
    path = "/api/{taxonomy}/{id}",
    params(
        ("taxonomy" = String, Path, description = "`categories` or `languages`"),
        ("id" = i32, Path, description = "Term id")
    ),
    responses(
        (status = 200, description = "Term", body = NamedRefSchema),
        (status = 404, description = "Term not found", body = ErrorSchema)
    ),
    tags = ["taxonomy"],
    operation_id = "getTerm",
    security([])
)]
#[get("/{id}")]
pub async fn get_term(
    kind: web::Data<TaxonomyKind>,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Term>> {
    let kind = **kind;
    state
        .taxonomy(kind)
        .find(TermId::new(path.into_inner()))
        .await
        .map_err(repository_error(kind.resource()))?
        .map(web::Json)
        .ok_or_else(|| not_found(kind))
}

/// Books tagged with a term.
#[utoipa::path(
    get,
    path = "/api/{taxonomy}/{id}/books",
    params(
        ("taxonomy" = String, Path, description = "`categories` or `languages`"),
        ("id" = i32, Path, description = "Term id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of books", body = BookPageSchema),
        (status = 404, description = "No books for the term", body = ErrorSchema)
    ),
    tags = ["taxonomy"],
    operation_id = "listTermBooks",
    security([])
)]
#[get("/{id}/books")]
pub async fn term_books(
    req: HttpRequest,
    kind: web::Data<TaxonomyKind>,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let kind = **kind;
    let term = TermId::new(path.into_inner());
    let filter = match kind {
        TaxonomyKind::Category => BookFilter {
            category_id: Some(term),
            ..BookFilter::default()
        },
        TaxonomyKind::Language => BookFilter {
            language_id: Some(term),
            ..BookFilter::default()
        },
    };
    let books = state
        .books
        .list(&filter, query.page_request()?)
        .await
        .map_err(repository_error(Resource::Book))?;
    if books.pagination.total == 0 {
        return Err(Error::not_found(kind.no_books_message()));
    }
    Ok(page_response(&req, &books))
}

/// Add a term.
#[utoipa::path(
    post,
    path = "/api/{taxonomy}",
    params(("taxonomy" = String, Path, description = "`categories` or `languages`")),
    request_body = TermRequest,
    responses(
        (status = 201, description = "Term added; body carries `category_id` or `language_id`"),
        (status = 400, description = "Name missing", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["taxonomy"],
    operation_id = "createTerm",
    security(("SessionCookie" = []))
)]
#[post("")]
pub async fn create_term(
    _admin: AdminUser,
    kind: web::Data<TaxonomyKind>,
    state: web::Data<HttpState>,
    payload: web::Json<TermRequest>,
) -> ApiResult<HttpResponse> {
    let kind = **kind;
    let name = payload.name(kind)?;
    let id = state
        .taxonomy(kind)
        .create(&name)
        .await
        .map_err(repository_error(kind.resource()))?;
    Ok(HttpResponse::Created().json(json!({
        "message": kind.created_message(),
        kind.id_key(): id,
    })))
}

/// Rename a term.
#[utoipa::path(
    put,
    path = "/api/{taxonomy}/{id}",
    params(
        ("taxonomy" = String, Path, description = "`categories` or `languages`"),
        ("id" = i32, Path, description = "Term id")
    ),
    request_body = TermRequest,
    responses(
        (status = 200, description = "Term updated", body = MessageBody),
        (status = 400, description = "Name missing", body = ErrorSchema),
        (status = 404, description = "Term not found", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["taxonomy"],
    operation_id = "updateTerm",
    security(("SessionCookie" = []))
)]
#[put("/{id}")]
pub async fn update_term(
    _admin: AdminUser,
    kind: web::Data<TaxonomyKind>,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<TermRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let kind = **kind;
    let name = payload.name(kind)?;
    let renamed = state
        .taxonomy(kind)
        .rename(TermId::new(path.into_inner()), &name)
        .await
        .map_err(|err| err.into_rename_error(kind.resource()))?;
    if !renamed {
        return Err(not_found(kind));
    }
    Ok(web::Json(message(kind, "updated")))
}

/// Delete a term and untag its books.
#[utoipa::path(
    delete,
    path = "/api/{taxonomy}/{id}",
    params(
        ("taxonomy" = String, Path, description = "`categories` or `languages`"),
        ("id" = i32, Path, description = "Term id")
    ),
    responses(
        (status = 200, description = "Term deleted", body = MessageBody),
        (status = 404, description = "Term not found", body = ErrorSchema)
    ),
    tags = ["taxonomy"],
    operation_id = "deleteTerm",
    security(("SessionCookie" = []))
)]
#[delete("/{id}")]
pub async fn delete_term(
    _admin: AdminUser,
    kind: web::Data<TaxonomyKind>,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageBody>> {
    let kind = **kind;
    let deleted = state
        .taxonomy(kind)
        .delete(TermId::new(path.into_inner()))
        .await
        .map_err(repository_error(kind.resource()))?;
    if !deleted {
        return Err(not_found(kind));
    }
    Ok(web::Json(message(kind, "deleted")))
}

/// Routes for one taxonomy, mounted at `path`.
pub fn scope(path: &str, kind: TaxonomyKind) -> actix_web::Scope {
    web::scope(path)
        .app_data(web::Data::new(kind))
        .service(list_terms)
        .service(create_term)
        .service(term_books)
        .service(get_term)
        .service(update_term)
        .service(delete_term)
}

/// `/categories` and `/languages` scopes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(scope("/categories", TaxonomyKind::Category))
        .service(scope("/languages", TaxonomyKind::Language));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::domain::ports::RepositoryError;
    use crate::inbound::http::test_utils::{MockPorts, sample_book, sign_in, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pagination::Page;
    use rstest::rstest;
    use serde_json::Value;

    fn mount(cfg: &mut web::ServiceConfig) {
        cfg.service(web::scope("/api").configure(configure));
    }

    #[actix_web::test]
    async fn categories_and_languages_use_their_own_ports() {
        let mut ports = MockPorts::default();
        ports.categories.expect_find().returning(|id| {
            Ok(Some(Term {
                id,
                name: "fantasy".to_owned(),
            }))
        });
        ports.languages.expect_find().returning(|_| Ok(None));
        let app = test::init_service(test_app(ports.into_state(), mount)).await;

        let category =
            test::call_service(&app, test::TestRequest::get().uri("/api/categories/3").to_request())
                .await;
        assert_eq!(category.status(), StatusCode::OK);
        let body: Value = test::read_body_json(category).await;
        assert_eq!(body, json!({"id": 3, "name": "fantasy"}));

        let language =
            test::call_service(&app, test::TestRequest::get().uri("/api/languages/3").to_request())
                .await;
        assert_eq!(language.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(language).await;
        assert_eq!(body["message"], "Language not found");
    }

    #[rstest]
    #[case("/api/categories", "Category added", "category_id")]
    #[case("/api/languages", "Language added", "language_id")]
    #[actix_web::test]
    async fn create_names_the_id_after_the_kind(
        #[case] uri: &str,
        #[case] message: &str,
        #[case] key: &str,
    ) {
        let mut ports = MockPorts::default();
        ports
            .categories
            .expect_create()
            .withf(|name| name == "science fiction")
            .returning(|_| Ok(TermId::new(8)));
        ports
            .languages
            .expect_create()
            .withf(|name| name == "science fiction")
            .returning(|_| Ok(TermId::new(8)));
        let app = test::init_service(test_app(ports.into_state(), mount)).await;
        let cookie = sign_in(&app, Role::Admin).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(uri)
                .cookie(cookie)
                .set_json(json!({"name": "Science  Fiction"}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], message);
        assert_eq!(body[key], 8);
    }

    #[actix_web::test]
    async fn create_requires_a_name() {
        let app = test::init_service(test_app(MockPorts::default().into_state(), mount)).await;
        let cookie = sign_in(&app, Role::Admin).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/languages")
                .cookie(cookie)
                .set_json(json!({}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Language name is required");
    }

    #[actix_web::test]
    async fn duplicate_names_conflict() {
        let mut ports = MockPorts::default();
        ports
            .categories
            .expect_create()
            .returning(|_| Err(RepositoryError::conflict(2)));
        let app = test::init_service(test_app(ports.into_state(), mount)).await;
        let cookie = sign_in(&app, Role::Admin).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/categories")
                .cookie(cookie)
                .set_json(json!({"name": "Fantasy"}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Category with this name already exists");
    }

    #[actix_web::test]
    async fn term_books_filter_by_kind() {
        let mut ports = MockPorts::default();
        ports
            .books
            .expect_list()
            .withf(|filter, _| {
                filter.language_id == Some(TermId::new(2)) && filter.category_id.is_none()
            })
            .returning(|_, page| Ok(Page::new(vec![sample_book(1, "the hobbit")], page, 1)));
        let app = test::init_service(test_app(ports.into_state(), mount)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/languages/2/books").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn empty_term_books_are_404() {
        let mut ports = MockPorts::default();
        ports
            .books
            .expect_list()
            .returning(|_, page| Ok(Page::new(Vec::new(), page, 0)));
        let app = test::init_service(test_app(ports.into_state(), mount)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/categories/2/books").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "No books found for this category");
    }

    #[rstest]
    #[case(false, StatusCode::NOT_FOUND)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn rename_reports_missing_terms(#[case] renamed: bool, #[case] expected: StatusCode) {
        let mut ports = MockPorts::default();
        ports
            .categories
            .expect_rename()
            .returning(move |_, _| Ok(renamed));
        let app = test::init_service(test_app(ports.into_state(), mount)).await;
        let cookie = sign_in(&app, Role::Admin).await;

        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/categories/5")
                .cookie(cookie)
                .set_json(json!({"name": "Horror"}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), expected);
    }

    #[actix_web::test]
    async fn delete_confirms_with_the_label() {
        let mut ports = MockPorts::default();
        ports.languages.expect_delete().returning(|_| Ok(true));
        let app = test::init_service(test_app(ports.into_state(), mount)).await;
        let cookie = sign_in(&app, Role::Admin).await;

        let response = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/languages/5")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Language deleted");
    }
}
