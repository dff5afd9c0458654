//! In-memory port doubles and an app builder for HTTP integration tests.
//!
//! Users and taxonomy terms are stored in `Mutex<Vec<_>>`; the remaining
//! ports answer every call with a connection failure so tests can assert the
//! outage path.

#![allow(
    dead_code,
    reason = "Each integration test binary uses a different subset of helpers"
)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::Utc;
use pagination::{Page, PageRequest};

use bookshelf::Trace;
use bookshelf::domain::ports::{
    AuthorRepository, BookRepository, CollectionRepository, EnrichmentService, RepositoryError,
    StatsQuery, TaxonomyRepository, UserRepository,
};
use bookshelf::domain::{
    Author, AuthorId, AuthorImageUpdate, AuthorSummary, AuthorshipChange, BackfillReport, Book,
    BookChanges, BookDetail, BookFilter, BookId, CollectionChanges, CollectionFilter,
    CollectionId, CollectionSummary, CoverCandidate, CoverRefresh, CoverSweepReport,
    DashboardCounts, Error, ImportReport, MembershipChange, NewBook, NewCollection, NewUser,
    PasswordHash, ProfileStats, Role, Term, TermId, User, UserAccount, UserAccounts, UserChanges,
    UserId,
};
use bookshelf::inbound::http;
use bookshelf::inbound::http::health::HealthState;
use bookshelf::inbound::http::state::{HttpState, HttpStatePorts};

/// Password given to every seeded account.
pub const PASSWORD: &str = "password123";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn paginate<T: Clone>(rows: &[T], page: PageRequest) -> Page<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let data = rows.iter().skip(offset).take(limit).cloned().collect();
    Page::new(data, page, rows.len() as u64)
}

/// Accounts held in memory, keyed by insertion order.
#[derive(Default)]
pub struct InMemoryUsers {
    accounts: Mutex<Vec<UserAccount>>,
}

impl InMemoryUsers {
    /// Store with one admin (`alice_reader`) and one reader (`bob_bookworm`).
    pub fn seeded() -> Self {
        let users = Self::default();
        users.insert("alice_reader", "alice@example.com", Role::Admin);
        users.insert("bob_bookworm", "bob@example.com", Role::User);
        users
    }

    fn insert(&self, username: &str, email: &str, role: Role) -> User {
        let mut accounts = lock(&self.accounts);
        let id = i32::try_from(accounts.len()).unwrap_or(i32::MAX) + 1;
        let user = User {
            id: UserId::new(id),
            username: username.to_owned(),
            email: email.to_owned(),
            role,
            created_at: Utc::now(),
        };
        accounts.push(UserAccount {
            user: user.clone(),
            password_hash: PasswordHash::from_password(PASSWORD),
        });
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, RepositoryError> {
        let rows: Vec<User> = lock(&self.accounts)
            .iter()
            .map(|account| account.user.clone())
            .filter(|user| {
                search.as_deref().is_none_or(|needle| {
                    user.username.contains(needle) || user.email.contains(needle)
                })
            })
            .collect();
        Ok(paginate(&rows, page))
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.accounts)
            .iter()
            .find(|account| account.user.id == id)
            .map(|account| account.user.clone()))
    }

    async fn find_account(&self, identifier: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(lock(&self.accounts)
            .iter()
            .find(|account| {
                account.user.username == identifier || account.user.email == identifier
            })
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut accounts = lock(&self.accounts);
        if accounts.iter().any(|account| {
            account.user.username.eq_ignore_ascii_case(&user.username)
                || account.user.email.eq_ignore_ascii_case(&user.email)
        }) {
            return Err(RepositoryError::duplicate("users_username_key"));
        }
        let id = i32::try_from(accounts.len()).unwrap_or(i32::MAX) + 1;
        let created = User {
            id: UserId::new(id),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        accounts.push(UserAccount {
            user: created.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut accounts = lock(&self.accounts);
        let Some(account) = accounts.iter_mut().find(|account| account.user.id == id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            account.user.username.clone_from(username);
        }
        if let Some(email) = &changes.email {
            account.user.email.clone_from(email);
        }
        if let Some(role) = changes.role {
            account.user.role = role;
        }
        if let Some(hash) = &changes.password_hash {
            account.password_hash = hash.clone();
        }
        Ok(Some(account.user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut accounts = lock(&self.accounts);
        let before = accounts.len();
        accounts.retain(|account| account.user.id != id);
        Ok(accounts.len() != before)
    }
}

#[async_trait]
impl StatsQuery for InMemoryUsers {
    async fn dashboard(&self) -> Result<DashboardCounts, RepositoryError> {
        Ok(DashboardCounts {
            users: lock(&self.accounts).len() as i64,
            ..DashboardCounts::default()
        })
    }

    async fn profile_stats(&self, _user: UserId) -> Result<ProfileStats, RepositoryError> {
        Ok(ProfileStats::default())
    }
}

/// Category or language names held in memory.
#[derive(Default)]
pub struct InMemoryTerms {
    terms: Mutex<Vec<Term>>,
    next_id: Mutex<i32>,
}

#[async_trait]
impl TaxonomyRepository for InMemoryTerms {
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Term>, RepositoryError> {
        let mut rows: Vec<Term> = lock(&self.terms)
            .iter()
            .filter(|term| search.as_deref().is_none_or(|needle| term.name.contains(needle)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(&rows, page))
    }

    async fn find(&self, id: TermId) -> Result<Option<Term>, RepositoryError> {
        Ok(lock(&self.terms).iter().find(|term| term.id == id).cloned())
    }

    async fn create(&self, name: &str) -> Result<TermId, RepositoryError> {
        let mut terms = lock(&self.terms);
        if let Some(existing) = terms.iter().find(|term| term.name == name) {
            return Err(RepositoryError::conflict(existing.id.get()));
        }
        let mut next_id = lock(&self.next_id);
        *next_id += 1;
        let id = TermId::new(*next_id);
        terms.push(Term {
            id,
            name: name.to_owned(),
        });
        Ok(id)
    }

    async fn rename(&self, id: TermId, name: &str) -> Result<bool, RepositoryError> {
        let mut terms = lock(&self.terms);
        if let Some(existing) = terms.iter().find(|term| term.name == name && term.id != id) {
            return Err(RepositoryError::conflict(existing.id.get()));
        }
        Ok(terms
            .iter_mut()
            .find(|term| term.id == id)
            .map(|term| term.name = name.to_owned())
            .is_some())
    }

    async fn delete(&self, id: TermId) -> Result<bool, RepositoryError> {
        let mut terms = lock(&self.terms);
        let before = terms.len();
        terms.retain(|term| term.id != id);
        Ok(terms.len() != before)
    }
}

/// Ports whose database is down.
#[derive(Default)]
pub struct Offline;

fn down<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::connection("connection refused"))
}

fn unavailable<T>() -> Result<T, Error> {
    Err(Error::service_unavailable("Open Library unavailable"))
}

#[async_trait]
impl BookRepository for Offline {
    async fn list(
        &self,
        _filter: &BookFilter,
        _page: PageRequest,
    ) -> Result<Page<BookDetail>, RepositoryError> {
        down()
    }
    async fn find(&self, _id: BookId) -> Result<Option<BookDetail>, RepositoryError> {
        down()
    }
    async fn find_by_title(&self, _title: &str) -> Result<Option<BookDetail>, RepositoryError> {
        down()
    }
    async fn find_duplicate(&self, _book: &NewBook) -> Result<Option<BookId>, RepositoryError> {
        down()
    }
    async fn create(&self, _book: &NewBook) -> Result<BookId, RepositoryError> {
        down()
    }
    async fn update(&self, _id: BookId, _changes: &BookChanges) -> Result<bool, RepositoryError> {
        down()
    }
    async fn delete(&self, _id: BookId) -> Result<bool, RepositoryError> {
        down()
    }
    async fn by_author_name(&self, _name: &str) -> Result<Vec<Book>, RepositoryError> {
        down()
    }
    async fn without_cover_ids(
        &self,
        _limit: Option<i64>,
    ) -> Result<Vec<CoverCandidate>, RepositoryError> {
        down()
    }
    async fn without_cover_urls(&self) -> Result<Vec<CoverCandidate>, RepositoryError> {
        down()
    }
    async fn set_cover_id(&self, _id: BookId, _cover_id: &str) -> Result<bool, RepositoryError> {
        down()
    }
    async fn set_cover_url(&self, _id: BookId, _cover_url: &str) -> Result<bool, RepositoryError> {
        down()
    }
}

#[async_trait]
impl AuthorRepository for Offline {
    async fn list(
        &self,
        _search: Option<String>,
        _page: PageRequest,
    ) -> Result<Page<AuthorSummary>, RepositoryError> {
        down()
    }
    async fn find(&self, _id: AuthorId) -> Result<Option<AuthorSummary>, RepositoryError> {
        down()
    }
    async fn search(&self, _name: &str) -> Result<Vec<Author>, RepositoryError> {
        down()
    }
    async fn create(&self, _name: &str) -> Result<Author, RepositoryError> {
        down()
    }
    async fn rename(&self, _id: AuthorId, _name: &str) -> Result<Option<Author>, RepositoryError> {
        down()
    }
    async fn delete(&self, _id: AuthorId) -> Result<bool, RepositoryError> {
        down()
    }
    async fn link_book(
        &self,
        _author: AuthorId,
        _book: BookId,
    ) -> Result<AuthorshipChange, RepositoryError> {
        down()
    }
    async fn unlink_book(
        &self,
        _author: AuthorId,
        _book: BookId,
    ) -> Result<AuthorshipChange, RepositoryError> {
        down()
    }
    async fn set_image_url(
        &self,
        _id: AuthorId,
        _image_url: &str,
    ) -> Result<Option<Author>, RepositoryError> {
        down()
    }
    async fn missing_images(&self) -> Result<Vec<Author>, RepositoryError> {
        down()
    }
}

#[async_trait]
impl CollectionRepository for Offline {
    async fn list(
        &self,
        _filter: &CollectionFilter,
        _page: PageRequest,
    ) -> Result<Page<CollectionSummary>, RepositoryError> {
        down()
    }
    async fn find(&self, _id: CollectionId) -> Result<Option<CollectionSummary>, RepositoryError> {
        down()
    }
    async fn create(&self, _collection: &NewCollection) -> Result<CollectionId, RepositoryError> {
        down()
    }
    async fn update(
        &self,
        _id: CollectionId,
        _changes: &CollectionChanges,
    ) -> Result<bool, RepositoryError> {
        down()
    }
    async fn delete(&self, _id: CollectionId) -> Result<bool, RepositoryError> {
        down()
    }
    async fn add_book(
        &self,
        _id: CollectionId,
        _book: BookId,
    ) -> Result<MembershipChange, RepositoryError> {
        down()
    }
    async fn remove_book(&self, _id: CollectionId, _book: BookId) -> Result<bool, RepositoryError> {
        down()
    }
    async fn replace_books(
        &self,
        _id: CollectionId,
        _books: &[BookId],
    ) -> Result<MembershipChange, RepositoryError> {
        down()
    }
}

#[async_trait]
impl EnrichmentService for Offline {
    async fn refresh_book_cover(&self, _id: BookId) -> Result<CoverRefresh, Error> {
        unavailable()
    }
    async fn refresh_missing_cover_urls(&self) -> Result<CoverSweepReport, Error> {
        unavailable()
    }
    async fn backfill_cover_ids(&self) -> Result<BackfillReport, Error> {
        unavailable()
    }
    async fn backfill_author_images(&self) -> Result<BackfillReport, Error> {
        unavailable()
    }
    async fn set_author_image(
        &self,
        _id: AuthorId,
        _image_url: &str,
    ) -> Result<AuthorImageUpdate, Error> {
        unavailable()
    }
    async fn import_from_search(&self, _query: &str, _limit: u32) -> Result<ImportReport, Error> {
        unavailable()
    }
    async fn books_without_covers(&self) -> Result<Vec<CoverCandidate>, Error> {
        unavailable()
    }
}

/// HTTP state over in-memory users and terms, with everything else offline.
pub fn http_state() -> web::Data<HttpState> {
    let users = Arc::new(InMemoryUsers::seeded());
    let offline = Arc::new(Offline);
    web::Data::new(HttpState::new(HttpStatePorts {
        books: offline.clone(),
        authors: offline.clone(),
        categories: Arc::new(InMemoryTerms::default()),
        languages: Arc::new(InMemoryTerms::default()),
        collections: offline.clone(),
        users: users.clone(),
        stats: users.clone(),
        accounts: Arc::new(UserAccounts::new(users.clone(), users)),
        enrichment: offline,
    }))
}

/// Full application: trace middleware, cookie sessions and every route.
pub fn app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    App::new()
        .app_data(state)
        .app_data(health)
        .wrap(
            SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                .cookie_name("session".to_owned())
                .cookie_secure(false)
                .build(),
        )
        .wrap(Trace)
        .configure(http::configure)
}

/// Session cookie from a response, if one was set.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Log in through `/auth/login` and return the session cookie.
pub async fn login<S, B>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({"username": username, "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "login failed for {username}");
    session_cookie(&response).expect("session cookie")
}
