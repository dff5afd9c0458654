//! Collection endpoints.
//!
//! Reads are public. Writes need a session; owners edit their own
//! collections and admins edit any.
//!
//! ```text
//! GET    /api/collections?user_id=2
//! GET    /api/collections/{id}
//! POST   /api/collections                  {"name":"Summer reads"}
//! PUT    /api/collections/{id}             {"description":"Beach books"}
//! DELETE /api/collections/{id}
//! GET    /api/collections/{id}/books
//! POST   /api/collections/{id}/books       {"book_id":7}
//! PUT    /api/collections/{id}/books       {"book_ids":[7,8]}
//! DELETE /api/collections/{id}/books/{book_id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::repository_error;
use crate::domain::text::normalize;
use crate::domain::{
    BookFilter, BookId, CollectionChanges, CollectionFilter, CollectionId, CollectionSummary,
    CollectionValidationError, Error, MembershipChange, NewCollection, Resource, SessionUser,
    UserId, can_act_for, can_edit_collection,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::CurrentUser;
use crate::inbound::http::payloads::{ListQuery, MessageBody, page_response};
use crate::inbound::http::schemas::{
    BookPageSchema, CollectionPageSchema, CollectionSummarySchema, ErrorSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, id_list, positive_id, required};

/// Listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CollectionListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Case-insensitive name substring.
    pub search: Option<String>,
    /// Only collections owned by this user.
    pub user_id: Option<i32>,
}

impl CollectionListQuery {
    fn filter(&self) -> Result<CollectionFilter, Error> {
        Ok(CollectionFilter {
            owner: self
                .user_id
                .map(|id| positive_id(id, FieldName::new("user_id")))
                .transpose()?,
            search: self.search.as_deref().and_then(normalize),
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

/// Create body; `user_id` defaults to the caller.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct NewCollectionRequest {
    #[schema(example = "Summer reads")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<i32>,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CollectionChangesRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `{book_id}` body for adding one book.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct MembershipRequest {
    pub book_id: Option<i32>,
}

/// `{book_ids}` body replacing every member.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ReplaceBooksRequest {
    pub book_ids: Option<Vec<i32>>,
}

fn not_found() -> Error {
    Error::not_found(Resource::Collection.not_found_message())
}

fn membership_error(change: MembershipChange) -> Option<Error> {
    match change {
        MembershipChange::Applied => None,
        MembershipChange::CollectionMissing => Some(not_found()),
        MembershipChange::BookMissing => Some(Error::not_found(Resource::Book.not_found_message())),
    }
}

/// Load a collection the caller may modify.
async fn editable(
    state: &HttpState,
    user: &SessionUser,
    id: CollectionId,
) -> Result<CollectionSummary, Error> {
    let collection = state
        .collections
        .find(id)
        .await
        .map_err(repository_error(Resource::Collection))?
        .ok_or_else(not_found)?;
    if !can_edit_collection(user, collection.collection.user_id) {
        debug!(user = %user.id, collection = %id, "collection edit refused");
        return Err(Error::forbidden("You can only modify your own collections"));
    }
    Ok(collection)
}

/// List collections.
#[utoipa::path(
    get,
    path = "/api/collections",
    params(CollectionListQuery),
    responses(
        (status = 200, description = "Page of collections", body = CollectionPageSchema),
        (status = 400, description = "Invalid paging or filter", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "listCollections",
    security([])
)]
#[get("")]
pub async fn list_collections(
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<CollectionListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.filter()?;
    let collections = state
        .collections
        .list(&filter, query.paging().page_request()?)
        .await
        .map_err(repository_error(Resource::Collection))?;
    Ok(page_response(&req, &collections))
}

/// Fetch one collection with its owner and size.
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(("id" = i32, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Collection", body = CollectionSummarySchema),
        (status = 404, description = "Collection not found", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "getCollection",
    security([])
)]
#[get("/{id}")]
pub async fn get_collection(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<CollectionSummary>> {
    state
        .collections
        .find(CollectionId::new(path.into_inner()))
        .await
        .map_err(repository_error(Resource::Collection))?
        .map(web::Json)
        .ok_or_else(not_found)
}

/// Create a collection for the caller, or for another user when admin.
#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = NewCollectionRequest,
    responses(
        (status = 201, description = "Collection added; body carries `collection_id`"),
        (status = 400, description = "Name missing", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Creating for another user", body = ErrorSchema),
        (status = 404, description = "Owner not found", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "createCollection",
    security(("SessionCookie" = []))
)]
#[post("")]
pub async fn create_collection(
    CurrentUser(user): CurrentUser,
    state: web::Data<HttpState>,
    payload: web::Json<NewCollectionRequest>,
) -> ApiResult<HttpResponse> {
    let owner = match payload.user_id {
        Some(raw) => positive_id::<UserId>(raw, FieldName::new("user_id"))?,
        None => user.id,
    };
    if !can_act_for(&user, owner) {
        return Err(Error::forbidden("You can only create collections for yourself"));
    }
    let collection =
        NewCollection::try_new(payload.name.as_deref(), payload.description.as_deref(), owner)?;
    let collection_id = state
        .collections
        .create(&collection)
        .await
        .map_err(repository_error(Resource::Collection))?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Collection added",
        "collection_id": collection_id,
    })))
}

/// Rename or re-describe a collection.
#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(("id" = i32, Path, description = "Collection id")),
    request_body = CollectionChangesRequest,
    responses(
        (status = 200, description = "Collection updated", body = MessageBody),
        (status = 400, description = "Nothing to update", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Collection not found", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "updateCollection",
    security(("SessionCookie" = []))
)]
#[put("/{id}")]
pub async fn update_collection(
    CurrentUser(user): CurrentUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<CollectionChangesRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = CollectionId::new(path.into_inner());
    let changes =
        CollectionChanges::try_new(payload.name.as_deref(), payload.description.as_deref())?;
    editable(&state, &user, id).await?;
    let updated = state
        .collections
        .update(id, &changes)
        .await
        .map_err(|err| err.into_rename_error(Resource::Collection))?;
    if !updated {
        return Err(not_found());
    }
    Ok(web::Json(MessageBody::new("Collection updated")))
}

/// Delete a collection.
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(("id" = i32, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Collection deleted", body = MessageBody),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Collection not found", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "deleteCollection",
    security(("SessionCookie" = []))
)]
#[delete("/{id}")]
pub async fn delete_collection(
    CurrentUser(user): CurrentUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = CollectionId::new(path.into_inner());
    editable(&state, &user, id).await?;
    let deleted = state
        .collections
        .delete(id)
        .await
        .map_err(repository_error(Resource::Collection))?;
    if !deleted {
        return Err(not_found());
    }
    Ok(web::Json(MessageBody::new("Collection deleted")))
}

/// Books in a collection.
#[utoipa::path(
    get,
    path = "/api/collections/{id}/books",
    params(("id" = i32, Path, description = "Collection id"), ListQuery),
    responses(
        (status = 200, description = "Page of books", body = BookPageSchema),
        (status = 404, description = "No books in the collection", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "listCollectionBooks",
    security([])
)]
#[get("/{id}/books")]
pub async fn collection_books(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = BookFilter {
        collection_id: Some(CollectionId::new(path.into_inner())),
        ..BookFilter::default()
    };
    let books = state
        .books
        .list(&filter, query.page_request()?)
        .await
        .map_err(repository_error(Resource::Book))?;
    if books.pagination.total == 0 {
        return Err(Error::not_found("No books found in this collection"));
    }
    Ok(page_response(&req, &books))
}

/// Add one book to a collection.
#[utoipa::path(
    post,
    path = "/api/collections/{id}/books",
    params(("id" = i32, Path, description = "Collection id")),
    request_body = MembershipRequest,
    responses(
        (status = 201, description = "Book added", body = MessageBody),
        (status = 400, description = "book_id missing", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Collection or book not found", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "addCollectionBook",
    security(("SessionCookie" = []))
)]
#[post("/{id}/books")]
pub async fn add_collection_book(
    CurrentUser(user): CurrentUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<MembershipRequest>,
) -> ApiResult<HttpResponse> {
    let id = CollectionId::new(path.into_inner());
    let raw = required(payload.book_id, FieldName::new("book_id"), "book_id is required")?;
    let book: BookId = positive_id(raw, FieldName::new("book_id"))?;
    editable(&state, &user, id).await?;
    let change = state
        .collections
        .add_book(id, book)
        .await
        .map_err(repository_error(Resource::Collection))?;
    if let Some(err) = membership_error(change) {
        return Err(err);
    }
    Ok(HttpResponse::Created().json(MessageBody::new("Book added to collection")))
}

/// Replace every book in a collection.
#[utoipa::path(
    put,
    path = "/api/collections/{id}/books",
    params(("id" = i32, Path, description = "Collection id")),
    request_body = ReplaceBooksRequest,
    responses(
        (status = 200, description = "Books replaced", body = MessageBody),
        (status = 400, description = "book_ids missing", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Collection or book not found", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "replaceCollectionBooks",
    security(("SessionCookie" = []))
)]
#[put("/{id}/books")]
pub async fn replace_collection_books(
    CurrentUser(user): CurrentUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<ReplaceBooksRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = CollectionId::new(path.into_inner());
    let books: Vec<BookId> = id_list(payload.into_inner().book_ids, FieldName::new("book_ids"))?
        .ok_or(CollectionValidationError::MissingBookIds)?;
    editable(&state, &user, id).await?;
    let change = state
        .collections
        .replace_books(id, &books)
        .await
        .map_err(repository_error(Resource::Collection))?;
    if let Some(err) = membership_error(change) {
        return Err(err);
    }
    Ok(web::Json(MessageBody::new("Collection books updated")))
}

/// Remove one book from a collection.
#[utoipa::path(
    delete,
    path = "/api/collections/{id}/books/{book_id}",
    params(
        ("id" = i32, Path, description = "Collection id"),
        ("book_id" = i32, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book removed", body = MessageBody),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Collection missing or book not a member", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "removeCollectionBook",
    security(("SessionCookie" = []))
)]
#[delete("/{id}/books/{book_id}")]
pub async fn remove_collection_book(
    CurrentUser(user): CurrentUser,
    state: web::Data<HttpState>,
    path: web::Path<(i32, i32)>,
) -> ApiResult<web::Json<MessageBody>> {
    let (raw_collection, raw_book) = path.into_inner();
    let id = CollectionId::new(raw_collection);
    editable(&state, &user, id).await?;
    let removed = state
        .collections
        .remove_book(id, BookId::new(raw_book))
        .await
        .map_err(repository_error(Resource::Collection))?;
    if !removed {
        return Err(Error::not_found("Book not found in this collection"));
    }
    Ok(web::Json(MessageBody::new("Book removed from collection")))
}

/// Routes mounted under `/api/collections`.
pub fn scope() -> actix_web::Scope {
    web::scope("/collections")
        .service(list_collections)
        .service(create_collection)
        .service(collection_books)
        .service(add_collection_book)
        .service(replace_collection_books)
        .service(remove_collection_book)
        .service(get_collection)
        .service(update_collection)
        .service(delete_collection)
}

#[cfg(test)]
#[path = "collections_tests.rs"]
mod tests;
