//! Builders wiring Diesel adapters and domain services into HTTP state.

use std::sync::Arc;

use actix_web::web;

use bookshelf::domain::ports::{
    AccountService, AuthorRepository, BibliographicSource, BookRepository, EnrichmentService,
    StatsQuery, UserRepository,
};
use bookshelf::domain::{CoverUrls, OpenLibraryEnrichment, UserAccounts};
use bookshelf::inbound::http::state::{HttpState, HttpStatePorts};
use bookshelf::outbound::persistence::{
    DbPool, DieselAuthorRepository, DieselBookRepository, DieselCollectionRepository,
    DieselStatsQuery, DieselTaxonomyRepository, DieselUserRepository,
};

/// Build the shared HTTP state over `pool` and the Open Library `source`.
pub(super) fn build_http_state(
    pool: &DbPool,
    source: Arc<dyn BibliographicSource>,
    covers: CoverUrls,
) -> web::Data<HttpState> {
    let books: Arc<dyn BookRepository> = Arc::new(DieselBookRepository::new(pool.clone()));
    let authors: Arc<dyn AuthorRepository> = Arc::new(DieselAuthorRepository::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool.clone()));
    let stats: Arc<dyn StatsQuery> = Arc::new(DieselStatsQuery::new(pool.clone()));

    let accounts: Arc<dyn AccountService> =
        Arc::new(UserAccounts::new(users.clone(), stats.clone()));
    let enrichment: Arc<dyn EnrichmentService> = Arc::new(OpenLibraryEnrichment::new(
        books.clone(),
        authors.clone(),
        source,
        covers,
    ));

    web::Data::new(HttpState::new(HttpStatePorts {
        books,
        authors,
        categories: Arc::new(DieselTaxonomyRepository::categories(pool.clone())),
        languages: Arc::new(DieselTaxonomyRepository::languages(pool.clone())),
        collections: Arc::new(DieselCollectionRepository::new(pool.clone())),
        users,
        stats,
        accounts,
        enrichment,
    }))
}
