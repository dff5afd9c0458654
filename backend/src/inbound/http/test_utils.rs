//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::ports::{
    MockAccountService, MockAuthorRepository, MockBookRepository, MockCollectionRepository,
    MockEnrichmentService, MockStatsQuery, MockTaxonomyRepository, MockUserRepository,
};
use crate::domain::{Role, SessionUser, UserId};

use super::error::{
    ApiResult, form_error_handler, json_error_handler, path_error_handler, query_error_handler,
};
use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `response`.
///
/// # Panics
///
/// Panics when the response did not set a `session` cookie.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Administrator used by handler tests.
pub fn admin() -> SessionUser {
    SessionUser {
        id: UserId::new(1),
        username: "alice_reader".to_owned(),
        email: "alice@example.com".to_owned(),
        role: Role::Admin,
    }
}

/// Regular user used by handler tests.
pub fn reader() -> SessionUser {
    SessionUser {
        id: UserId::new(2),
        username: "bob_bookworm".to_owned(),
        email: "bob@example.com".to_owned(),
        role: Role::User,
    }
}

/// Mock implementation of every port; unexpected calls panic.
pub struct MockPorts {
    pub books: MockBookRepository,
    pub authors: MockAuthorRepository,
    pub categories: MockTaxonomyRepository,
    pub languages: MockTaxonomyRepository,
    pub collections: MockCollectionRepository,
    pub users: MockUserRepository,
    pub stats: MockStatsQuery,
    pub accounts: MockAccountService,
    pub enrichment: MockEnrichmentService,
}

impl Default for MockPorts {
    fn default() -> Self {
        Self {
            books: MockBookRepository::new(),
            authors: MockAuthorRepository::new(),
            categories: MockTaxonomyRepository::new(),
            languages: MockTaxonomyRepository::new(),
            collections: MockCollectionRepository::new(),
            users: MockUserRepository::new(),
            stats: MockStatsQuery::new(),
            accounts: MockAccountService::new(),
            enrichment: MockEnrichmentService::new(),
        }
    }
}

impl MockPorts {
    /// Freeze the expectations into handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            books: Arc::new(self.books),
            authors: Arc::new(self.authors),
            categories: Arc::new(self.categories),
            languages: Arc::new(self.languages),
            collections: Arc::new(self.collections),
            users: Arc::new(self.users),
            stats: Arc::new(self.stats),
            accounts: Arc::new(self.accounts),
            enrichment: Arc::new(self.enrichment),
        }))
    }
}

async fn sign_in_for_tests(
    session: SessionContext,
    role: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = if role.parse::<Role>()? == Role::Admin {
        admin()
    } else {
        reader()
    };
    session.persist_user(&user)?;
    Ok(HttpResponse::Ok().finish())
}

/// App with session middleware, JSON error handlers, `state`, and a
/// `POST /test/sign-in/{role}` helper route.
pub fn test_app(
    state: web::Data<HttpState>,
    configure: impl FnOnce(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(test_session_middleware())
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::FormConfig::default().error_handler(form_error_handler))
        .route("/test/sign-in/{role}", web::post().to(sign_in_for_tests))
        .configure(configure)
}

/// Sign in through the helper route and return the session cookie.
pub async fn sign_in<S, B>(app: &S, role: Role) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("/test/sign-in/{}", role.as_str()))
        .to_request();
    let response = test::call_service(app, request).await;
    session_cookie(&response)
}

/// Stored book with one author, used by handler tests.
pub fn sample_book(id: i32, title: &str) -> crate::domain::BookDetail {
    use crate::domain::{AuthorId, AuthorRef, Book, BookDetail, BookId};

    BookDetail {
        book: Book {
            id: BookId::new(id),
            title: title.to_owned(),
            publication_year: Some(1937),
            open_library_id: Some("OL27482W".to_owned()),
            cover_id: None,
            cover_url: None,
            isbn: None,
            created_at: chrono::Utc::now(),
        },
        authors: vec![AuthorRef {
            id: AuthorId::new(1),
            name: "j.r.r. tolkien".to_owned(),
        }],
        categories: Vec::new(),
        languages: Vec::new(),
    }
}
