//! Request guards for signed-in and administrator-only endpoints.
//!
//! Handlers take [`CurrentUser`] or [`AdminUser`] as an argument instead of
//! checking the session themselves. API clients are refused with a JSON
//! `401`/`403`; browsers (requests accepting `text/html`) are redirected with
//! `303 See Other`, to the login page with a `next` parameter when anonymous
//! and to `/` when signed in without the admin role.

use actix_session::SessionExt;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload};
use futures_util::future::{Ready, ready};
use url::form_urlencoded;

use crate::domain::{Error, SessionUser};

use super::session::SessionContext;

/// Path of the login endpoint browsers are sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Refusal produced by the access guards.
#[derive(Debug, thiserror::Error)]
pub enum AccessDenied {
    /// Browser request sent elsewhere.
    #[error("redirecting to {location}")]
    Redirect {
        /// Target of the `Location` header.
        location: String,
    },
    /// API request refused with a JSON error.
    #[error(transparent)]
    Api(#[from] Error),
}

impl ResponseError for AccessDenied {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Redirect { .. } => StatusCode::SEE_OTHER,
            Self::Api(error) => error.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Redirect { location } => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, location.as_str()))
                .finish(),
            Self::Api(error) => error.error_response(),
        }
    }
}

/// Whether the caller asked for an HTML page.
fn wants_html(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Login URL that returns the browser to the current request afterwards.
fn login_redirect(req: &HttpRequest) -> String {
    let current = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
    let next: String = form_urlencoded::byte_serialize(current.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={next}")
}

fn signed_in(req: &HttpRequest) -> Result<SessionUser, AccessDenied> {
    let session = SessionContext::new(req.get_session());
    match session.user()? {
        Some(user) => Ok(user),
        None if wants_html(req) => Err(AccessDenied::Redirect {
            location: login_redirect(req),
        }),
        None => Err(Error::unauthorized("Login required").into()),
    }
}

fn administrator(req: &HttpRequest) -> Result<SessionUser, AccessDenied> {
    let user = signed_in(req)?;
    if user.is_admin() {
        Ok(user)
    } else if wants_html(req) {
        Err(AccessDenied::Redirect {
            location: "/".to_owned(),
        })
    } else {
        Err(Error::forbidden("Admin access required").into())
    }
}

/// A signed-in user; extraction fails for anonymous callers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl FromRequest for CurrentUser {
    type Error = AccessDenied;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(signed_in(req).map(Self))
    }
}

/// A signed-in administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

impl FromRequest for AdminUser {
    type Error = AccessDenied;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(administrator(req).map(Self))
    }
}

/// Accept only same-site relative paths as post-login destinations.
///
/// # Examples
/// ```
/// use bookshelf::inbound::http::access::safe_next;
///
/// assert_eq!(safe_next("/api/books?page=2"), Some("/api/books?page=2"));
/// assert_eq!(safe_next("//evil.example"), None);
/// assert_eq!(safe_next("https://evil.example"), None);
/// ```
#[must_use]
pub fn safe_next(next: &str) -> Option<&str> {
    let next = next.trim();
    let relative = next.starts_with('/') && !next.starts_with("//");
    (relative && !next.contains('\\')).then_some(next)
}
