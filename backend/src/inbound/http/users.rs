//! User administration endpoints. Every route requires an admin session.
//!
//! ```text
//! GET    /api/users?search=alice
//! GET    /api/users/{id}
//! POST   /api/users        {"username":"erin","email":"erin@example.com","password":"secret1"}
//! PUT    /api/users/{id}   {"role":"admin"}
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::auth::{validate_email, validate_password};
use crate::domain::ports::repository_error;
use crate::domain::text::normalize;
use crate::domain::{
    AccountForm, AccountValidationError, Error, NewUser, PasswordHash, Resource, Role, User,
    UserChanges, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::AdminUser;
use crate::inbound::http::payloads::{ListQuery, MessageBody, page_response};
use crate::inbound::http::schemas::{ErrorSchema, RoleSchema, UserPageSchema, UserSchema};
use crate::inbound::http::state::HttpState;

const CREATE_FIELDS_REQUIRED: &str = "Username, email, and password are required";
const UPDATE_FIELDS_REQUIRED: &str =
    "At least one field (username, email, or password) is required";

/// Create body for `POST /api/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct NewUserRequest {
    #[schema(example = "erin_editor")]
    pub username: Option<String>,
    #[schema(example = "erin@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    /// Defaults to `user`.
    #[schema(value_type = Option<RoleSchema>)]
    pub role: Option<String>,
}

impl NewUserRequest {
    fn into_new_user(self) -> Result<NewUser, Error> {
        let form = AccountForm::try_from_parts(
            self.username.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
        .map_err(|err| match err {
            AccountValidationError::MissingFields => Error::invalid_request(CREATE_FIELDS_REQUIRED),
            other => other.into(),
        })?;
        let role = parse_role(self.role.as_deref())?.unwrap_or_default();
        Ok(NewUser {
            username: form.username().to_owned(),
            email: form.email().to_owned(),
            password_hash: form.password_hash(),
            role,
        })
    }
}

/// Partial update body for `PUT /api/users/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UserChangesRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(value_type = Option<RoleSchema>)]
    pub role: Option<String>,
}

impl UserChangesRequest {
    fn into_changes(self) -> Result<UserChanges, Error> {
        let email = self.email.as_deref().and_then(normalize);
        if let Some(email) = email.as_deref() {
            validate_email(email)?;
        }
        let password = self.password.filter(|password| !password.is_empty());
        if let Some(password) = password.as_deref() {
            validate_password(password)?;
        }
        let changes = UserChanges {
            username: self.username.as_deref().and_then(normalize),
            email,
            password_hash: password.as_deref().map(PasswordHash::from_password),
            role: parse_role(self.role.as_deref())?,
        };
        if changes.is_empty() {
            return Err(Error::invalid_request(UPDATE_FIELDS_REQUIRED));
        }
        Ok(changes)
    }
}

fn parse_role(raw: Option<&str>) -> Result<Option<Role>, Error> {
    raw.filter(|role| !role.trim().is_empty())
        .map(str::parse::<Role>)
        .transpose()
        .map_err(Error::from)
}

fn not_found() -> Error {
    Error::not_found(Resource::User.not_found_message())
}

/// List accounts, optionally filtered by username or email.
#[utoipa::path(
    get,
    path = "/api/users",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of users", body = UserPageSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("SessionCookie" = []))
)]
#[get("")]
pub async fn list_users(
    _admin: AdminUser,
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let users = state
        .users
        .list(query.search(), query.page_request()?)
        .await
        .map_err(repository_error(Resource::User))?;
    Ok(page_response(&req, &users))
}

/// Fetch one account.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("SessionCookie" = []))
)]
#[get("/{id}")]
pub async fn get_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<User>> {
    state
        .users
        .find(UserId::new(path.into_inner()))
        .await
        .map_err(repository_error(Resource::User))?
        .map(web::Json)
        .ok_or_else(not_found)
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUserRequest,
    responses(
        (status = 201, description = "User added; body carries `user_id`"),
        (status = 400, description = "Field missing or invalid", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security(("SessionCookie" = []))
)]
#[post("")]
pub async fn create_user(
    AdminUser(admin): AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<NewUserRequest>,
) -> ApiResult<HttpResponse> {
    let new_user = payload.into_inner().into_new_user()?;
    let user = state
        .users
        .create(&new_user)
        .await
        .map_err(repository_error(Resource::User))?;
    info!(admin = %admin.id, user = %user.id, role = %user.role, "user created");
    Ok(HttpResponse::Created().json(json!({
        "message": "User added",
        "user_id": user.id,
    })))
}

/// Update username, email, password or role.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserChangesRequest,
    responses(
        (status = 200, description = "User updated", body = MessageBody),
        (status = 400, description = "Nothing to update", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("SessionCookie" = []))
)]
#[put("/{id}")]
pub async fn update_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UserChangesRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let changes = payload.into_inner().into_changes()?;
    state
        .users
        .update(UserId::new(path.into_inner()), &changes)
        .await
        .map_err(|err| err.into_rename_error(Resource::User))?
        .ok_or_else(not_found)?;
    Ok(web::Json(MessageBody::new("User updated")))
}

/// Delete an account and its collections.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageBody),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("SessionCookie" = []))
)]
#[delete("/{id}")]
pub async fn delete_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageBody>> {
    let deleted = state
        .users
        .delete(UserId::new(path.into_inner()))
        .await
        .map_err(repository_error(Resource::User))?;
    if !deleted {
        return Err(not_found());
    }
    Ok(web::Json(MessageBody::new("User deleted")))
}

/// Routes mounted under `/api/users`.
pub fn scope() -> actix_web::Scope {
    web::scope("/users")
        .service(list_users)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
}
