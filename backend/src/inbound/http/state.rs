//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::TaxonomyKind;
use crate::domain::ports::{
    AccountService, AuthorRepository, BookRepository, CollectionRepository, EnrichmentService,
    StatsQuery, TaxonomyRepository, UserRepository,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub books: Arc<dyn BookRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn TaxonomyRepository>,
    pub languages: Arc<dyn TaxonomyRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub stats: Arc<dyn StatsQuery>,
    pub accounts: Arc<dyn AccountService>,
    pub enrichment: Arc<dyn EnrichmentService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub books: Arc<dyn BookRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn TaxonomyRepository>,
    pub languages: Arc<dyn TaxonomyRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub stats: Arc<dyn StatsQuery>,
    pub accounts: Arc<dyn AccountService>,
    pub enrichment: Arc<dyn EnrichmentService>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            books,
            authors,
            categories,
            languages,
            collections,
            users,
            stats,
            accounts,
            enrichment,
        } = ports;
        Self {
            books,
            authors,
            categories,
            languages,
            collections,
            users,
            stats,
            accounts,
            enrichment,
        }
    }

    /// Repository serving one taxonomy.
    #[must_use]
    pub fn taxonomy(&self, kind: TaxonomyKind) -> &Arc<dyn TaxonomyRepository> {
        match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Language => &self.languages,
        }
    }
}
