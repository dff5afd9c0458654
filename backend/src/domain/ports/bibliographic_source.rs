//! Driven port for the Open Library bibliographic API.
//!
//! The domain owns the request and response shapes so enrichment and seeding
//! stay adapter-agnostic. Values arrive raw; formatting rules live in
//! [`crate::domain::enrichment`].

use async_trait::async_trait;

use super::define_port_error;

/// Title (and optional author) search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkQuery {
    /// Title terms.
    pub title: String,
    /// Restrict to works by this author.
    pub author: Option<String>,
    /// Maximum number of results.
    pub limit: u32,
}

impl WorkQuery {
    /// Title-only search.
    #[must_use]
    pub fn by_title(title: impl Into<String>, limit: u32) -> Self {
        Self {
            title: title.into(),
            author: None,
            limit,
        }
    }
}

/// One work as returned by search or subject listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkSummary {
    /// Work key, e.g. `/works/OL45883W`.
    pub key: Option<String>,
    /// Title as published.
    pub title: String,
    /// Author display names.
    pub author_names: Vec<String>,
    /// Year of first publication.
    pub first_publish_year: Option<i32>,
    /// Primary cover id from search results.
    pub cover_i: Option<i64>,
    /// Cover ids from the work record.
    pub covers: Vec<i64>,
    /// Edition key usable as a cover fallback.
    pub cover_edition_key: Option<String>,
    /// MARC language codes, e.g. `eng`.
    pub languages: Vec<String>,
    /// ISBNs of known editions.
    pub isbns: Vec<String>,
    /// Subject headings.
    pub subjects: Vec<String>,
}

impl WorkSummary {
    /// Fold subjects and covers from the full work record into the summary.
    pub fn merge_details(&mut self, details: WorkDetails) {
        if !details.subjects.is_empty() {
            self.subjects = details.subjects;
        }
        if !details.covers.is_empty() {
            self.covers = details.covers;
        }
    }
}

/// Extra fields only present on the full work record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkDetails {
    /// Subject headings.
    pub subjects: Vec<String>,
    /// Cover ids.
    pub covers: Vec<i64>,
}

/// First edition of a work.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditionSummary {
    /// MARC language codes.
    pub languages: Vec<String>,
    /// Free-form publish date, e.g. `1965` or `June 1965`.
    pub publish_date: Option<String>,
    /// Cover ids.
    pub covers: Vec<i64>,
}

/// Best author match for a name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorMatch {
    /// Open Library author id, e.g. `OL23919A`.
    pub olid: String,
    /// Display name.
    pub name: String,
}

define_port_error! {
    /// Errors surfaced while calling the bibliographic API.
    pub enum BibliographicSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "open library transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } =>
            "open library timeout: {message}",
        /// The API rate-limited the request.
        RateLimited { message: String } =>
            "open library rate limited request: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "open library response decode failed: {message}",
        /// The API rejected the request.
        InvalidRequest { message: String } =>
            "open library request invalid: {message}",
    }
}

/// Port for querying Open Library.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BibliographicSource: Send + Sync {
    /// Search works by title and optional author (`/search.json`).
    async fn search_works(
        &self,
        query: &WorkQuery,
    ) -> Result<Vec<WorkSummary>, BibliographicSourceError>;

    /// Fetch the full work record (`{key}.json`).
    async fn work_details(&self, key: &str) -> Result<WorkDetails, BibliographicSourceError>;

    /// Fetch the first listed edition of a work (`{key}/editions.json`).
    async fn first_edition(
        &self,
        key: &str,
    ) -> Result<Option<EditionSummary>, BibliographicSourceError>;

    /// Best author match for a name (`/search/authors.json`).
    async fn search_author(
        &self,
        name: &str,
    ) -> Result<Option<AuthorMatch>, BibliographicSourceError>;

    /// Works filed under a subject slug (`/subjects/{subject}.json`).
    async fn subject_works(
        &self,
        subject: &str,
        limit: u32,
    ) -> Result<Vec<WorkSummary>, BibliographicSourceError>;

    /// Whether an image URL answers `HEAD` with 200.
    async fn image_exists(&self, url: &str) -> Result<bool, BibliographicSourceError>;
}
