//! Open Library enrichment domain service.
//!
//! Implements the [`EnrichmentService`] driving port. Sweeps never abort on a
//! single failing row: source errors are logged and tallied in the report.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::enrichment::{
    BookCandidate, CoverUrls, ImageSize, author_olid, cover_id as resolve_cover_id,
};
use crate::domain::ports::{
    AuthorRepository, BibliographicSource, BookRepository, EnrichmentService, RepositoryError,
    WorkQuery, WorkSummary, repository_error,
};
use crate::domain::text::normalize;
use crate::domain::{
    AuthorId, AuthorImageUpdate, BackfillReport, BookId, CoverCandidate, CoverRefresh,
    CoverSweepReport, Error, ImportReport, Links, NewBook, Resource,
};

const MISSING_COVER_LISTING_LIMIT: i64 = 50;
const SEARCH_ISBN_ATTEMPTS: usize = 3;

/// Enrichment service implementing the driving port.
pub struct OpenLibraryEnrichment<B: ?Sized, A: ?Sized, S: ?Sized> {
    books: Arc<B>,
    authors: Arc<A>,
    source: Arc<S>,
    covers: CoverUrls,
}

impl<B: ?Sized, A: ?Sized, S: ?Sized> OpenLibraryEnrichment<B, A, S> {
    /// Create a new service over the given ports.
    pub fn new(books: Arc<B>, authors: Arc<A>, source: Arc<S>, covers: CoverUrls) -> Self {
        Self {
            books,
            authors,
            source,
            covers,
        }
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl<B, A, S> OpenLibraryEnrichment<B, A, S>
where
    B: BookRepository + ?Sized,
    A: AuthorRepository + ?Sized,
    S: BibliographicSource + ?Sized,
{
    async fn image_available(&self, url: &str) -> bool {
        match self.source.image_exists(url).await {
            Ok(found) => found,
            Err(err) => {
                warn!(url, error = %err, "image probe failed");
                false
            }
        }
    }

    /// ISBN cover first, then a title and author search.
    async fn find_cover_url(
        &self,
        isbn: Option<&str>,
        title: &str,
        author: Option<&str>,
    ) -> Option<String> {
        if let Some(isbn) = isbn.filter(|value| !value.trim().is_empty()) {
            let url = self.covers.cover_by_isbn(isbn);
            if self.image_available(&url).await {
                return Some(url);
            }
        }

        let query = WorkQuery {
            title: title.to_owned(),
            author: Some(author?.to_owned()),
            limit: 1,
        };
        let work = match self.source.search_works(&query).await {
            Ok(works) => works.into_iter().next()?,
            Err(err) => {
                warn!(title, error = %err, "cover search failed");
                return None;
            }
        };

        if let Some(cover) = work.cover_i {
            let url = self.covers.cover_by_id(&cover.to_string(), ImageSize::Large);
            if self.image_available(&url).await {
                return Some(url);
            }
        }
        for isbn in work.isbns.iter().take(SEARCH_ISBN_ATTEMPTS) {
            let url = self.covers.cover_by_isbn(isbn);
            if self.image_available(&url).await {
                return Some(url);
            }
        }
        None
    }

    /// Fold subjects and covers from the full work record when reachable.
    async fn with_details(&self, mut work: WorkSummary) -> WorkSummary {
        if let Some(key) = work.key.clone() {
            match self.source.work_details(&key).await {
                Ok(details) => work.merge_details(details),
                Err(err) => warn!(key = %key, error = %err, "work details unavailable"),
            }
        }
        work
    }

    async fn backfill_one_cover_id(&self, book: &CoverCandidate, report: &mut BackfillReport) {
        let works = match self
            .source
            .search_works(&WorkQuery::by_title(book.title.clone(), 1))
            .await
        {
            Ok(works) => works,
            Err(err) => {
                warn!(book_id = %book.id, error = %err, "cover id search failed");
                report.errors += 1;
                return;
            }
        };
        let Some(work) = works.into_iter().next() else {
            report.not_found += 1;
            return;
        };
        let work = self.with_details(work).await;
        let Some(cover_id) = resolve_cover_id(&work) else {
            report.not_found += 1;
            return;
        };
        let url = self.covers.cover_by_id(&cover_id, ImageSize::Large);
        if !self.image_available(&url).await {
            report.not_found += 1;
            return;
        }
        match self.books.set_cover_id(book.id, &cover_id).await {
            Ok(true) => report.updated += 1,
            Ok(false) => report.errors += 1,
            Err(err) => {
                warn!(book_id = %book.id, error = %err, "storing cover id failed");
                report.errors += 1;
            }
        }
    }

    async fn backfill_one_author_image(
        &self,
        id: AuthorId,
        name: &str,
        report: &mut BackfillReport,
    ) {
        let found = match self.source.search_author(name).await {
            Ok(found) => found,
            Err(err) => {
                warn!(author_id = %id, error = %err, "author search failed");
                report.errors += 1;
                return;
            }
        };
        let Some(found) = found else {
            report.not_found += 1;
            return;
        };
        let url = self
            .covers
            .author_image(&author_olid(&found.olid), ImageSize::Medium);
        if !self.image_available(&url).await {
            report.not_found += 1;
            return;
        }
        match self.authors.set_image_url(id, &url).await {
            Ok(Some(_)) => report.updated += 1,
            Ok(None) => report.errors += 1,
            Err(err) => {
                warn!(author_id = %id, error = %err, "storing author image failed");
                report.errors += 1;
            }
        }
    }

    fn new_book_from(candidate: &BookCandidate) -> Option<NewBook> {
        let title = normalize(&candidate.title)?;
        let authors = candidate
            .primary_author()
            .and_then(normalize)
            .map(|name| Links::from_names(vec![name]))
            .unwrap_or_default();
        let languages = normalize(candidate.primary_language())
            .map(|name| Links::from_names(vec![name]))
            .unwrap_or_default();
        Some(NewBook {
            title,
            publication_year: candidate.publication_year,
            open_library_id: candidate.open_library_id.clone(),
            cover_id: candidate.cover_id.clone(),
            authors,
            languages,
            ..NewBook::default()
        })
    }

    async fn import_one(&self, work: WorkSummary, report: &mut ImportReport) {
        let work = self.with_details(work).await;
        let candidate = BookCandidate::from_work(&work);
        let Some(book) = Self::new_book_from(&candidate) else {
            report.errors += 1;
            return;
        };
        match self.books.find_duplicate(&book).await {
            Ok(Some(_)) => {
                report.duplicates += 1;
                return;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(title = %book.title, error = %err, "duplicate check failed");
                report.errors += 1;
                return;
            }
        }
        match self.books.create(&book).await {
            Ok(id) => {
                report.imported += 1;
                report.books.push(id);
            }
            Err(RepositoryError::Conflict { .. }) => report.duplicates += 1,
            Err(err) => {
                warn!(title = %book.title, error = %err, "import failed");
                report.errors += 1;
            }
        }
    }
}

#[async_trait]
impl<B, A, S> EnrichmentService for OpenLibraryEnrichment<B, A, S>
where
    B: BookRepository + ?Sized,
    A: AuthorRepository + ?Sized,
    S: BibliographicSource + ?Sized,
{
    async fn refresh_book_cover(&self, id: BookId) -> Result<CoverRefresh, Error> {
        let detail = self
            .books
            .find(id)
            .await
            .map_err(repository_error(Resource::Book))?
            .ok_or_else(|| Error::not_found(Resource::Book.not_found_message()))?;
        let author = detail.authors.first().map(|author| author.name.as_str());
        let found = self
            .find_cover_url(detail.book.isbn.as_deref(), &detail.book.title, author)
            .await;
        let Some(url) = found else {
            return Ok(CoverRefresh::not_found());
        };
        self.books
            .set_cover_url(id, &url)
            .await
            .map_err(repository_error(Resource::Book))?;
        Ok(CoverRefresh::updated(url))
    }

    async fn refresh_missing_cover_urls(&self) -> Result<CoverSweepReport, Error> {
        let candidates = self
            .books
            .without_cover_urls()
            .await
            .map_err(repository_error(Resource::Book))?;
        let mut updated = 0_u32;
        for book in &candidates {
            let author = book.authors.first().map(String::as_str);
            let Some(url) = self
                .find_cover_url(book.isbn.as_deref(), &book.title, author)
                .await
            else {
                continue;
            };
            match self.books.set_cover_url(book.id, &url).await {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(err) => warn!(book_id = %book.id, error = %err, "storing cover url failed"),
            }
        }
        let report = CoverSweepReport::new(count(candidates.len()), updated);
        info!(
            total = report.total_count,
            updated = report.updated_count,
            "cover url sweep finished"
        );
        Ok(report)
    }

    async fn backfill_cover_ids(&self) -> Result<BackfillReport, Error> {
        let candidates = self
            .books
            .without_cover_ids(None)
            .await
            .map_err(repository_error(Resource::Book))?;
        let mut report = BackfillReport::default();
        for book in &candidates {
            report.processed += 1;
            self.backfill_one_cover_id(book, &mut report).await;
        }
        info!(?report, "cover id backfill finished");
        Ok(report)
    }

    async fn backfill_author_images(&self) -> Result<BackfillReport, Error> {
        let authors = self
            .authors
            .missing_images()
            .await
            .map_err(repository_error(Resource::Author))?;
        let mut report = BackfillReport::default();
        for author in &authors {
            report.processed += 1;
            self.backfill_one_author_image(author.id, &author.name, &mut report)
                .await;
        }
        info!(?report, "author image backfill finished");
        Ok(report)
    }

    async fn set_author_image(
        &self,
        id: AuthorId,
        image_url: &str,
    ) -> Result<AuthorImageUpdate, Error> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(Error::invalid_request("Image URL is required"));
        }
        if !(image_url.starts_with("http://") || image_url.starts_with("https://")) {
            return Err(Error::invalid_request(
                "Image URL must start with http:// or https://",
            ));
        }
        let author = self
            .authors
            .set_image_url(id, image_url)
            .await
            .map_err(repository_error(Resource::Author))?
            .ok_or_else(|| Error::not_found(Resource::Author.not_found_message()))?;
        Ok(AuthorImageUpdate {
            success: true,
            message: format!("Updated image URL for {}", author.name),
            image_url: image_url.to_owned(),
        })
    }

    async fn import_from_search(&self, query: &str, limit: u32) -> Result<ImportReport, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid_request("Query is required"));
        }
        let mut report = ImportReport::default();
        let works = match self
            .source
            .search_works(&WorkQuery::by_title(query, limit))
            .await
        {
            Ok(works) => works,
            Err(err) => {
                warn!(query, error = %err, "import search failed");
                report.errors = 1;
                return Ok(report);
            }
        };
        report.searched = count(works.len());
        for work in works {
            self.import_one(work, &mut report).await;
        }
        info!(
            query,
            imported = report.imported,
            duplicates = report.duplicates,
            errors = report.errors,
            "import finished"
        );
        Ok(report)
    }

    async fn books_without_covers(&self) -> Result<Vec<CoverCandidate>, Error> {
        self.books
            .without_cover_ids(Some(MISSING_COVER_LISTING_LIMIT))
            .await
            .map_err(repository_error(Resource::Book))
    }
}

#[cfg(test)]
#[path = "enrichment_service_tests.rs"]
mod tests;
