//! Helper endpoints used by the browser catalogue.
//!
//! ```text
//! GET  /api/frontend/books/by-author?author=tolkien
//! POST /api/frontend/books/update-cover/{id}
//! POST /api/frontend/covers/update-missing
//! POST /api/frontend/authors/update-image/{id}   {"image_url":"https://..."}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::repository_error;
use crate::domain::{
    AuthorId, AuthorImageUpdate, Book, BookId, CoverRefresh, CoverSweepReport, Resource,
    author_name,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::AdminUser;
use crate::inbound::http::schemas::{
    AuthorImageUpdateSchema, BookSchema, CoverRefreshSchema, CoverSweepReportSchema, ErrorSchema,
};
use crate::inbound::http::state::HttpState;

/// `?author=` for the by-author listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ByAuthorQuery {
    pub author: Option<String>,
}

/// `{image_url}` body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AuthorImageRequest {
    #[schema(example = "https://covers.openlibrary.org/a/olid/OL26320A-M.jpg")]
    pub image_url: Option<String>,
}

/// Books credited to an author, newest first.
#[utoipa::path(
    get,
    path = "/api/frontend/books/by-author",
    params(ByAuthorQuery),
    responses(
        (status = 200, description = "Books by the author", body = [BookSchema]),
        (status = 400, description = "Author name missing", body = ErrorSchema)
    ),
    tags = ["frontend"],
    operation_id = "booksByAuthor",
    security([])
)]
#[get("/books/by-author")]
pub async fn books_by_author(
    state: web::Data<HttpState>,
    query: web::Query<ByAuthorQuery>,
) -> ApiResult<web::Json<Vec<Book>>> {
    let name = author_name(query.author.as_deref())?;
    let books = state
        .books
        .by_author_name(&name)
        .await
        .map_err(repository_error(Resource::Book))?;
    Ok(web::Json(books))
}

/// Look up and store a cover URL for one book.
#[utoipa::path(
    post,
    path = "/api/frontend/books/update-cover/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Lookup finished; `success` says whether a cover was stored", body = CoverRefreshSchema),
        (status = 404, description = "Book not found", body = ErrorSchema),
        (status = 503, description = "Open Library unavailable", body = ErrorSchema)
    ),
    tags = ["frontend"],
    operation_id = "updateBookCover",
    security(("SessionCookie" = []))
)]
#[post("/books/update-cover/{id}")]
pub async fn update_book_cover(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<CoverRefresh>> {
    let refresh = state
        .enrichment
        .refresh_book_cover(BookId::new(path.into_inner()))
        .await?;
    Ok(web::Json(refresh))
}

/// Look up cover URLs for every book lacking one.
#[utoipa::path(
    post,
    path = "/api/frontend/covers/update-missing",
    responses(
        (status = 200, description = "Sweep finished", body = CoverSweepReportSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["frontend"],
    operation_id = "updateMissingCovers",
    security(("SessionCookie" = []))
)]
#[post("/covers/update-missing")]
pub async fn update_missing_covers(
    AdminUser(admin): AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<CoverSweepReport>> {
    let report = state.enrichment.refresh_missing_cover_urls().await?;
    info!(
        admin = %admin.id,
        total = report.total_count,
        updated = report.updated_count,
        "cover sweep finished"
    );
    Ok(web::Json(report))
}

/// Set an author's portrait URL by hand.
#[utoipa::path(
    post,
    path = "/api/frontend/authors/update-image/{id}",
    params(("id" = i32, Path, description = "Author id")),
    request_body = AuthorImageRequest,
    responses(
        (status = 200, description = "Image stored", body = AuthorImageUpdateSchema),
        (status = 400, description = "URL missing or not http(s)", body = ErrorSchema),
        (status = 404, description = "Author not found", body = ErrorSchema)
    ),
    tags = ["frontend"],
    operation_id = "updateAuthorImage",
    security(("SessionCookie" = []))
)]
#[post("/authors/update-image/{id}")]
pub async fn update_author_image(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<AuthorImageRequest>,
) -> ApiResult<web::Json<AuthorImageUpdate>> {
    let image_url = payload.image_url.as_deref().unwrap_or_default();
    let update = state
        .enrichment
        .set_author_image(AuthorId::new(path.into_inner()), image_url)
        .await?;
    Ok(web::Json(update))
}

/// Routes mounted under `/api/frontend`.
pub fn scope() -> actix_web::Scope {
    web::scope("/frontend")
        .service(books_by_author)
        .service(update_book_cover)
        .service(update_missing_covers)
        .service(update_author_image)
}
