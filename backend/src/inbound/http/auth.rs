//! Session endpoints: login, signup, logout and the caller's own account.
//!
//! Login and signup accept either JSON or an HTML form post.
//!
//! ```text
//! POST /auth/login    {"username":"alice_reader","password":"password123"}
//! POST /auth/signup   {"username":"erin","email":"erin@example.com","password":"secret1","password_confirm":"secret1"}
//! POST /auth/logout
//! GET  /auth/me
//! GET  /auth/profile
//! ```

use actix_web::http::header;
use actix_web::{Either, HttpResponse, get, post, route, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AccountForm, LoginCredentials, LoginValidationError, SessionUser};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::{CurrentUser, safe_next};
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::payloads::MessageBody;
use crate::inbound::http::schemas::{ErrorSchema, SessionUserSchema, UserProfileSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login body; `username` may also hold an email address.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "alice_reader")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Relative path to redirect to after login.
    pub next: Option<String>,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// `?next=` on the login URL.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Registration body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

fn body<T>(payload: Either<web::Json<T>, web::Form<T>>) -> T {
    match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

fn signed_in_response(status: actix_web::http::StatusCode, user: &SessionUser) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(private_no_cache_header())
        .json(user)
}

/// Authenticate and start a session.
///
/// Redirects with `303` when a safe relative `next` is supplied, otherwise
/// returns the session user.
#[utoipa::path(
    post,
    path = "/auth/login",
    params(NextQuery),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionUserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 303, description = "Signed in; redirect to `next`"),
        (status = 400, description = "Username or password missing", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    session: SessionContext,
    state: web::Data<HttpState>,
    query: web::Query<NextQuery>,
    payload: Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> ApiResult<HttpResponse> {
    let request = body(payload);
    let credentials = LoginCredentials::try_from(&request)?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(&user)?;
    info!(user = %user.id, "signed in");

    let next = request.next.as_deref().or(query.next.as_deref()).and_then(safe_next);
    if let Some(location) = next {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, location))
            .insert_header(private_no_cache_header())
            .finish());
    }
    Ok(signed_in_response(actix_web::http::StatusCode::OK, &user))
}

/// Register a `user` account and sign it in.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = SessionUserSchema),
        (status = 400, description = "Field missing or invalid", body = ErrorSchema),
        (status = 409, description = "Username or email already exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: Either<web::Json<SignupRequest>, web::Form<SignupRequest>>,
) -> ApiResult<HttpResponse> {
    let request = body(payload);
    let form = AccountForm::signup(
        &request.username,
        &request.email,
        &request.password,
        &request.password_confirm,
    )?;
    let user = state.accounts.signup(&form).await?;
    session.persist_user(&user)?;
    info!(user = %user.id, "account created");
    Ok(signed_in_response(actix_web::http::StatusCode::CREATED, &user))
}

/// End the session.
#[utoipa::path(
    method(get, post),
    path = "/auth/logout",
    responses((status = 200, description = "Signed out", body = MessageBody)),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[route("/logout", method = "GET", method = "POST")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    let name = session
        .user()?
        .map_or_else(|| "User".to_owned(), |user| user.username);
    session.clear();
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(MessageBody::new(format!(
            "Goodbye, {name}! You have been logged out."
        ))))
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Session user", body = SessionUserSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/me")]
pub async fn me(session: SessionContext) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    Ok(signed_in_response(actix_web::http::StatusCode::OK, &user))
}

/// Account details with collection statistics.
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfileSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "profile",
    security(("SessionCookie" = []))
)]
#[get("/profile")]
pub async fn profile(
    CurrentUser(user): CurrentUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let profile = state.accounts.profile(user.id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(profile))
}

/// Routes mounted under `/auth`.
pub fn scope() -> actix_web::Scope {
    web::scope("/auth")
        .service(login)
        .service(signup)
        .service(logout)
        .service(me)
        .service(profile)
}
