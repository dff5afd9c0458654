//! Reqwest-backed Open Library source adapter.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and JSON decoding into the port's records. Formatting
//! rules (cover ids, categories, language names) stay in the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    AuthorSearchResponseDto, EditionsResponseDto, SearchResponseDto, SubjectResponseDto, WorkDto,
};
use crate::domain::ports::{
    AuthorMatch, BibliographicSource, BibliographicSourceError, EditionSummary, WorkDetails,
    WorkQuery, WorkSummary,
};

/// Public Open Library API root.
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";
const DEFAULT_USER_AGENT: &str = "bookshelf-backend/0.1";

/// Open Library source adapter performing HTTP GET and HEAD requests.
pub struct OpenLibraryHttpSource {
    client: Client,
    base_url: Url,
}

impl OpenLibraryHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let base = Url::parse(DEFAULT_BASE_URL)?;
    /// let source = OpenLibraryHttpSource::new(base, Duration::from_secs(10))?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BibliographicSourceError> {
        self.base_url.join(path).map_err(|error| {
            BibliographicSourceError::invalid_request(format!("invalid path {path}: {error}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, BibliographicSourceError> {
        debug!(url = %url, "open library request");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode(body.as_ref())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, BibliographicSourceError> {
    serde_json::from_slice(body).map_err(|error| {
        BibliographicSourceError::decode(format!("invalid Open Library JSON payload: {error}"))
    })
}

/// Work keys arrive as `/works/OL1W`; bare ids are accepted too.
fn work_path(key: &str) -> String {
    let key = key.trim();
    if key.starts_with('/') {
        key.to_owned()
    } else {
        format!("/works/{key}")
    }
}

fn search_params(query: &WorkQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("title", query.title.clone()),
        ("limit", query.limit.max(1).to_string()),
    ];
    if let Some(author) = query.author.as_deref().filter(|a| !a.trim().is_empty()) {
        params.push(("author", author.to_owned()));
    }
    params
}

#[async_trait]
impl BibliographicSource for OpenLibraryHttpSource {
    async fn search_works(
        &self,
        query: &WorkQuery,
    ) -> Result<Vec<WorkSummary>, BibliographicSourceError> {
        let url = self.endpoint("/search.json")?;
        let response: SearchResponseDto = self.get_json(url, &search_params(query)).await?;
        Ok(response.docs.into_iter().map(WorkSummary::from).collect())
    }

    async fn work_details(&self, key: &str) -> Result<WorkDetails, BibliographicSourceError> {
        let url = self.endpoint(&format!("{}.json", work_path(key)))?;
        let work: WorkDto = self.get_json(url, &[]).await?;
        Ok(work.into())
    }

    async fn first_edition(
        &self,
        key: &str,
    ) -> Result<Option<EditionSummary>, BibliographicSourceError> {
        let url = self.endpoint(&format!("{}/editions.json", work_path(key)))?;
        let editions: EditionsResponseDto =
            self.get_json(url, &[("limit", "1".to_owned())]).await?;
        Ok(editions.entries.into_iter().next().map(EditionSummary::from))
    }

    async fn search_author(
        &self,
        name: &str,
    ) -> Result<Option<AuthorMatch>, BibliographicSourceError> {
        let url = self.endpoint("/search/authors.json")?;
        let response: AuthorSearchResponseDto = self
            .get_json(url, &[("q", name.to_owned()), ("limit", "1".to_owned())])
            .await?;
        Ok(response
            .docs
            .into_iter()
            .next()
            .and_then(|doc| doc.into_match()))
    }

    async fn subject_works(
        &self,
        subject: &str,
        limit: u32,
    ) -> Result<Vec<WorkSummary>, BibliographicSourceError> {
        let url = self.endpoint(&format!("/subjects/{}.json", subject.trim()))?;
        let response: SubjectResponseDto = self
            .get_json(
                url,
                &[
                    ("limit", limit.max(1).to_string()),
                    ("offset", "0".to_owned()),
                    ("details", "true".to_owned()),
                ],
            )
            .await?;
        Ok(response.works.into_iter().map(WorkSummary::from).collect())
    }

    async fn image_exists(&self, url: &str) -> Result<bool, BibliographicSourceError> {
        let url = Url::parse(url).map_err(|error| {
            BibliographicSourceError::invalid_request(format!("invalid image url: {error}"))
        })?;
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        Ok(response.status() == StatusCode::OK)
    }
}

fn map_transport_error(error: reqwest::Error) -> BibliographicSourceError {
    if error.is_timeout() {
        BibliographicSourceError::timeout(error.to_string())
    } else if error.is_decode() {
        BibliographicSourceError::decode(error.to_string())
    } else {
        BibliographicSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BibliographicSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => BibliographicSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            BibliographicSourceError::timeout(message)
        }
        _ if status.is_client_error() => BibliographicSourceError::invalid_request(message),
        _ => BibliographicSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
