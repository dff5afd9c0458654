//! Book catalogue endpoints.
//!
//! ```text
//! GET    /api/books?page=1&per_page=20&search=dune&no_cover=true
//! GET    /api/books/{id}
//! GET    /api/books/title/{title}
//! POST   /api/books          {"title":"Dune","author":"Frank Herbert"}
//! PUT    /api/books/{id}     {"category_ids":[3,4]}
//! DELETE /api/books/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::repository_error;
use crate::domain::text::{normalize, trimmed};
use crate::domain::{
    AuthorId, BookChanges, BookDetail, BookFilter, BookId, CollectionId, Error, Links, NewBook,
    Resource, TermId, book_title,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::AdminUser;
use crate::inbound::http::payloads::{ListQuery, MessageBody, page_response};
use crate::inbound::http::schemas::{BookDetailSchema, BookPageSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, id_list, positive_id};

/// Book listing filters on top of the shared paging parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Only books whose cover id is missing or empty.
    #[serde(default)]
    pub no_cover: bool,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub language_id: Option<i32>,
    pub collection_id: Option<i32>,
}

impl BookListQuery {
    fn filter(&self) -> Result<BookFilter, Error> {
        Ok(BookFilter {
            search: self.search.as_deref().and_then(normalize),
            no_cover: self.no_cover,
            author_id: optional_id::<AuthorId>(self.author_id, "author_id")?,
            category_id: optional_id::<TermId>(self.category_id, "category_id")?,
            language_id: optional_id::<TermId>(self.language_id, "language_id")?,
            collection_id: optional_id::<CollectionId>(self.collection_id, "collection_id")?,
        })
    }

    fn paging(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            per_page: self.per_page,
            search: None,
        }
    }
}

fn optional_id<Id: From<i32>>(raw: Option<i32>, field: &'static str) -> Result<Option<Id>, Error> {
    raw.map(|id| positive_id(id, FieldName::new(field)))
        .transpose()
}

/// Create or update payload. Absent fields are left alone on update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct BookRequest {
    #[schema(example = "Dune")]
    pub title: Option<String>,
    #[schema(example = 1965)]
    pub publication_year: Option<i32>,
    pub open_library_id: Option<String>,
    pub cover_id: Option<String>,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    /// Author name, found or created.
    #[schema(example = "Frank Herbert")]
    pub author: Option<String>,
    /// Language name, found or created.
    #[schema(example = "English")]
    pub language: Option<String>,
    pub author_ids: Option<Vec<i32>>,
    pub category_ids: Option<Vec<i32>>,
    pub language_ids: Option<Vec<i32>>,
}

impl BookRequest {
    fn relation<Id: From<i32>>(
        name: Option<&str>,
        ids: Option<Vec<i32>>,
        field: &'static str,
    ) -> Result<Option<Links<Id>>, Error> {
        let ids = id_list(ids, FieldName::new(field))?;
        let name = name.and_then(normalize);
        if ids.is_none() && name.is_none() {
            return Ok(None);
        }
        Ok(Some(Links {
            ids: ids.unwrap_or_default(),
            names: name.into_iter().collect(),
        }))
    }

    fn into_new_book(self) -> Result<NewBook, Error> {
        let title = book_title(self.title.as_deref())?;
        Ok(NewBook {
            title,
            publication_year: self.publication_year,
            open_library_id: trimmed(self.open_library_id.as_deref()),
            cover_id: trimmed(self.cover_id.as_deref()),
            cover_url: trimmed(self.cover_url.as_deref()),
            isbn: trimmed(self.isbn.as_deref()),
            authors: Self::relation(self.author.as_deref(), self.author_ids, "author_ids")?
                .unwrap_or_default(),
            categories: Self::relation(None, self.category_ids, "category_ids")?
                .unwrap_or_default(),
            languages: Self::relation(self.language.as_deref(), self.language_ids, "language_ids")?
                .unwrap_or_default(),
        })
    }

    fn into_changes(self) -> Result<BookChanges, Error> {
        let changes = BookChanges {
            title: self.title.as_deref().and_then(normalize),
            publication_year: self.publication_year,
            open_library_id: trimmed(self.open_library_id.as_deref()),
            cover_id: trimmed(self.cover_id.as_deref()),
            cover_url: trimmed(self.cover_url.as_deref()),
            isbn: trimmed(self.isbn.as_deref()),
            authors: Self::relation(self.author.as_deref(), self.author_ids, "author_ids")?,
            categories: Self::relation(None, self.category_ids, "category_ids")?,
            languages: Self::relation(self.language.as_deref(), self.language_ids, "language_ids")?,
        };
        Ok(changes.ensure_not_empty()?)
    }
}

/// `201` body for a created book.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookCreatedBody {
    #[schema(example = "Book added")]
    pub message: String,
    #[schema(value_type = i32, example = 12)]
    pub book_id: BookId,
}

fn not_found() -> Error {
    Error::not_found(Resource::Book.not_found_message())
}

/// List books with optional filters.
#[utoipa::path(
    get,
    path = "/api/books",
    params(BookListQuery),
    responses(
        (status = 200, description = "Page of books", body = BookPageSchema),
        (status = 400, description = "Invalid paging or filter", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "listBooks",
    security([])
)]
#[get("")]
pub async fn list_books(
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<BookListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.filter()?;
    let page = query.paging().page_request()?;
    let books = state
        .books
        .list(&filter, page)
        .await
        .map_err(repository_error(Resource::Book))?;
    Ok(page_response(&req, &books))
}

/// Fetch one book with its authors, categories and languages.
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book", body = BookDetailSchema),
        (status = 404, description = "Book not found", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "getBook",
    security([])
)]
#[get("/{id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<BookDetail>> {
    let id = BookId::new(path.into_inner());
    state
        .books
        .find(id)
        .await
        .map_err(repository_error(Resource::Book))?
        .map(web::Json)
        .ok_or_else(not_found)
}

/// Fetch a book by its normalised title.
#[utoipa::path(
    get,
    path = "/api/books/title/{title}",
    params(("title" = String, Path, description = "Exact title, case-insensitive")),
    responses(
        (status = 200, description = "Book", body = BookDetailSchema),
        (status = 400, description = "Blank title", body = ErrorSchema),
        (status = 404, description = "Book not found", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "getBookByTitle",
    security([])
)]
#[get("/title/{title}")]
pub async fn get_book_by_title(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookDetail>> {
    let title = normalize(&path).ok_or_else(|| Error::invalid_request("Invalid book title"))?;
    state
        .books
        .find_by_title(&title)
        .await
        .map_err(repository_error(Resource::Book))?
        .map(web::Json)
        .ok_or_else(not_found)
}

/// Add a book, linking or creating its author and language.
#[utoipa::path(
    post,
    path = "/api/books",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book added", body = BookCreatedBody),
        (status = 400, description = "Title missing", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Linked author, category or language missing", body = ErrorSchema),
        (status = 409, description = "Title already used", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "createBook",
    security(("SessionCookie" = []))
)]
#[post("")]
pub async fn create_book(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<BookRequest>,
) -> ApiResult<HttpResponse> {
    let book = payload.into_inner().into_new_book()?;
    let book_id = state
        .books
        .create(&book)
        .await
        .map_err(repository_error(Resource::Book))?;
    Ok(HttpResponse::Created().json(BookCreatedBody {
        message: "Book added".to_owned(),
        book_id,
    }))
}

/// Update scalar fields and replace relations that are supplied.
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book updated", body = MessageBody),
        (status = 400, description = "No fields to update", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Book not found", body = ErrorSchema),
        (status = 409, description = "Title already used", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "updateBook",
    security(("SessionCookie" = []))
)]
#[put("/{id}")]
pub async fn update_book(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<BookRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = BookId::new(path.into_inner());
    let changes = payload.into_inner().into_changes()?;
    let updated = state
        .books
        .update(id, &changes)
        .await
        .map_err(|err| err.into_rename_error(Resource::Book))?;
    if !updated {
        return Err(not_found());
    }
    Ok(web::Json(MessageBody::new("Book updated")))
}

/// Delete a book and its junction rows.
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted", body = MessageBody),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Book not found", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "deleteBook",
    security(("SessionCookie" = []))
)]
#[delete("/{id}")]
pub async fn delete_book(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageBody>> {
    let deleted = state
        .books
        .delete(BookId::new(path.into_inner()))
        .await
        .map_err(repository_error(Resource::Book))?;
    if !deleted {
        return Err(not_found());
    }
    Ok(web::Json(MessageBody::new("Book deleted")))
}

/// Routes mounted under `/api/books`.
pub fn scope() -> actix_web::Scope {
    web::scope("/books")
        .service(list_books)
        .service(create_book)
        .service(get_book_by_title)
        .service(get_book)
        .service(update_book)
        .service(delete_book)
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
