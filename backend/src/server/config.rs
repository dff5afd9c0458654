//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use bookshelf::domain::CoverUrls;
use bookshelf::domain::ports::BibliographicSource;
use bookshelf::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) source: Arc<dyn BibliographicSource>,
    pub(crate) covers: CoverUrls,
}

impl ServerConfig {
    /// Construct a server configuration from session settings and the pool.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        source: Arc<dyn BibliographicSource>,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            source,
            covers: CoverUrls::default(),
        }
    }

    /// Override the covers host used when building image URLs.
    #[must_use]
    pub fn with_cover_urls(mut self, covers: CoverUrls) -> Self {
        self.covers = covers;
        self
    }
}
