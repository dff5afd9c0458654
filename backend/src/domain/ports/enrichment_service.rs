//! Driving port for Open Library enrichment use-cases.

use async_trait::async_trait;

use crate::domain::{
    AuthorId, AuthorImageUpdate, BackfillReport, BookId, CoverCandidate, CoverRefresh,
    CoverSweepReport, Error, ImportReport,
};

/// Domain use-case port for enriching catalogue records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrichmentService: Send + Sync {
    /// Look up and store a cover URL for one book.
    async fn refresh_book_cover(&self, id: BookId) -> Result<CoverRefresh, Error>;

    /// Look up cover URLs for every book lacking one.
    async fn refresh_missing_cover_urls(&self) -> Result<CoverSweepReport, Error>;

    /// Look up cover ids for every book lacking one.
    async fn backfill_cover_ids(&self) -> Result<BackfillReport, Error>;

    /// Look up portraits for every author lacking one.
    async fn backfill_author_images(&self) -> Result<BackfillReport, Error>;

    /// Store a portrait URL supplied by an administrator.
    async fn set_author_image(
        &self,
        id: AuthorId,
        image_url: &str,
    ) -> Result<AuthorImageUpdate, Error>;

    /// Search Open Library and import the matches.
    async fn import_from_search(&self, query: &str, limit: u32) -> Result<ImportReport, Error>;

    /// Up to fifty books lacking a cover id, by title.
    async fn books_without_covers(&self) -> Result<Vec<CoverCandidate>, Error>;
}
