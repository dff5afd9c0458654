//! Author endpoints.
//!
//! ```text
//! GET    /api/authors?search=tolkien
//! GET    /api/authors/search?name=tolk
//! GET    /api/authors/{id}
//! POST   /api/authors                {"name":"Ursula K. Le Guin"}
//! PUT    /api/authors/{id}           {"name":"Ursula Le Guin"}
//! DELETE /api/authors/{id}
//! POST   /api/authors/add_book       {"author_id":1,"book_id":2}
//! POST   /api/authors/remove_book    {"author_id":1,"book_id":2}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::repository_error;
use crate::domain::{
    Author, AuthorId, AuthorSummary, AuthorshipChange, BookId, Error, Resource, author_name,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::AdminUser;
use crate::inbound::http::payloads::{ListQuery, MessageBody, page_response};
use crate::inbound::http::schemas::{AuthorPageSchema, AuthorSchema, AuthorSummarySchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, positive_id, required};

const BOTH_IDS_REQUIRED: &str = "Both author_id and book_id are required";

/// `{name}` body for create and rename.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AuthorRequest {
    #[schema(example = "Ursula K. Le Guin")]
    pub name: Option<String>,
}

/// `?name=` for the substring search.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorSearchQuery {
    pub name: Option<String>,
}

/// `{author_id, book_id}` body for linking and unlinking.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AuthorshipRequest {
    pub author_id: Option<i32>,
    pub book_id: Option<i32>,
}

impl AuthorshipRequest {
    fn ids(&self) -> Result<(AuthorId, BookId), Error> {
        let author = required(self.author_id, FieldName::new("author_id"), BOTH_IDS_REQUIRED)?;
        let book = required(self.book_id, FieldName::new("book_id"), BOTH_IDS_REQUIRED)?;
        Ok((
            positive_id(author, FieldName::new("author_id"))?,
            positive_id(book, FieldName::new("book_id"))?,
        ))
    }
}

/// Author echoed back after a write.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorWriteBody {
    #[schema(value_type = i32)]
    pub id: AuthorId,
    pub name: String,
    #[schema(example = "Author added successfully")]
    pub message: String,
}

impl AuthorWriteBody {
    fn new(author: Author, message: &str) -> Self {
        Self {
            id: author.id,
            name: author.name,
            message: message.to_owned(),
        }
    }
}

fn not_found() -> Error {
    Error::not_found(Resource::Author.not_found_message())
}

fn authorship_error(change: AuthorshipChange) -> Option<Error> {
    match change {
        AuthorshipChange::Applied => None,
        AuthorshipChange::AuthorMissing => Some(not_found()),
        AuthorshipChange::BookMissing => Some(Error::not_found(Resource::Book.not_found_message())),
    }
}

/// List authors with their book counts and titles.
#[utoipa::path(
    get,
    path = "/api/authors",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of authors", body = AuthorPageSchema),
        (status = 400, description = "Invalid paging", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "listAuthors",
    security([])
)]
#[get("")]
pub async fn list_authors(
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let page = query.page_request()?;
    let authors = state
        .authors
        .list(query.search(), page)
        .await
        .map_err(repository_error(Resource::Author))?;
    Ok(page_response(&req, &authors))
}

/// Authors whose name contains `name`.
#[utoipa::path(
    get,
    path = "/api/authors/search",
    params(AuthorSearchQuery),
    responses(
        (status = 200, description = "Matching authors", body = [AuthorSchema]),
        (status = 400, description = "Name parameter missing", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "searchAuthors",
    security([])
)]
#[get("/search")]
pub async fn search_authors(
    state: web::Data<HttpState>,
    query: web::Query<AuthorSearchQuery>,
) -> ApiResult<web::Json<Vec<Author>>> {
    let name = author_name(query.name.as_deref())
        .map_err(|_| Error::invalid_request("Name parameter is required"))?;
    let authors = state
        .authors
        .search(&name)
        .await
        .map_err(repository_error(Resource::Author))?;
    Ok(web::Json(authors))
}

/// Fetch one author.
#[utoipa::path(
    get,
    path = "/api/authors/{id}",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author", body = AuthorSummarySchema),
        (status = 404, description = "Author not found", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "getAuthor",
    security([])
)]
#[get("/{id}")]
pub async fn get_author(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<AuthorSummary>> {
    state
        .authors
        .find(AuthorId::new(path.into_inner()))
        .await
        .map_err(repository_error(Resource::Author))?
        .map(web::Json)
        .ok_or_else(not_found)
}

/// Add an author.
#[utoipa::path(
    post,
    path = "/api/authors",
    request_body = AuthorRequest,
    responses(
        (status = 201, description = "Author added", body = AuthorWriteBody),
        (status = 400, description = "Name missing", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "createAuthor",
    security(("SessionCookie" = []))
)]
#[post("")]
pub async fn create_author(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<AuthorRequest>,
) -> ApiResult<HttpResponse> {
    let name = author_name(payload.name.as_deref())?;
    let author = state
        .authors
        .create(&name)
        .await
        .map_err(repository_error(Resource::Author))?;
    Ok(HttpResponse::Created().json(AuthorWriteBody::new(author, "Author added successfully")))
}

/// Rename an author.
#[utoipa::path(
    put,
    path = "/api/authors/{id}",
    params(("id" = i32, Path, description = "Author id")),
    request_body = AuthorRequest,
    responses(
        (status = 200, description = "Author updated", body = AuthorWriteBody),
        (status = 400, description = "Name missing", body = ErrorSchema),
        (status = 404, description = "Author not found", body = ErrorSchema),
        (status = 409, description = "Another author has the name", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "updateAuthor",
    security(("SessionCookie" = []))
)]
#[put("/{id}")]
pub async fn update_author(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<AuthorRequest>,
) -> ApiResult<web::Json<AuthorWriteBody>> {
    let name = author_name(payload.name.as_deref())?;
    let author = state
        .authors
        .rename(AuthorId::new(path.into_inner()), &name)
        .await
        .map_err(|err| err.into_rename_error(Resource::Author))?
        .ok_or_else(not_found)?;
    Ok(web::Json(AuthorWriteBody::new(author, "Author updated successfully")))
}

/// Delete an author and unlink their books.
#[utoipa::path(
    delete,
    path = "/api/authors/{id}",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author deleted", body = MessageBody),
        (status = 404, description = "Author not found", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "deleteAuthor",
    security(("SessionCookie" = []))
)]
#[delete("/{id}")]
pub async fn delete_author(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageBody>> {
    let deleted = state
        .authors
        .delete(AuthorId::new(path.into_inner()))
        .await
        .map_err(repository_error(Resource::Author))?;
    if !deleted {
        return Err(not_found());
    }
    Ok(web::Json(MessageBody::new("Author deleted successfully")))
}

/// Credit an author on a book.
#[utoipa::path(
    post,
    path = "/api/authors/add_book",
    request_body = AuthorshipRequest,
    responses(
        (status = 201, description = "Book linked", body = MessageBody),
        (status = 400, description = "Id missing", body = ErrorSchema),
        (status = 404, description = "Author or book not found", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "addAuthorBook",
    security(("SessionCookie" = []))
)]
#[post("/add_book")]
pub async fn add_book(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<AuthorshipRequest>,
) -> ApiResult<HttpResponse> {
    let (author, book) = payload.ids()?;
    let change = state
        .authors
        .link_book(author, book)
        .await
        .map_err(repository_error(Resource::Author))?;
    if let Some(err) = authorship_error(change) {
        return Err(err);
    }
    Ok(HttpResponse::Created().json(MessageBody::new("Book added to author successfully")))
}

/// Remove an author's credit on a book.
#[utoipa::path(
    post,
    path = "/api/authors/remove_book",
    request_body = AuthorshipRequest,
    responses(
        (status = 200, description = "Book unlinked", body = MessageBody),
        (status = 400, description = "Id missing", body = ErrorSchema),
        (status = 404, description = "Author or book not found", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "removeAuthorBook",
    security(("SessionCookie" = []))
)]
#[post("/remove_book")]
pub async fn remove_book(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<AuthorshipRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let (author, book) = payload.ids()?;
    let change = state
        .authors
        .unlink_book(author, book)
        .await
        .map_err(repository_error(Resource::Author))?;
    if let Some(err) = authorship_error(change) {
        return Err(err);
    }
    Ok(web::Json(MessageBody::new("Book removed from author successfully")))
}

/// Routes mounted under `/api/authors`.
pub fn scope() -> actix_web::Scope {
    web::scope("/authors")
        .service(list_authors)
        .service(create_author)
        .service(search_authors)
        .service(add_book)
        .service(remove_book)
        .service(get_author)
        .service(update_author)
        .service(delete_author)
}
