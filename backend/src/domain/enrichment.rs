//! Open Library formatting rules and enrichment reports.
//!
//! Everything here is pure: it turns raw [`WorkSummary`] values into catalogue
//! fields and builds cover/portrait URLs. The orchestration that talks to the
//! network and the database lives in [`crate::domain::OpenLibraryEnrichment`].

use serde::Serialize;

use super::ids::BookId;
use super::ports::WorkSummary;

/// Default host serving cover and author images.
pub const DEFAULT_COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

const MAX_SUBJECTS_SCANNED: usize = 10;
const MAX_LANGUAGES: usize = 5;
const DEFAULT_LANGUAGE: &str = "English";

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("eng", "English"),
    ("fre", "French"),
    ("ger", "German"),
    ("spa", "Spanish"),
    ("ita", "Italian"),
    ("por", "Portuguese"),
    ("rus", "Russian"),
    ("jpn", "Japanese"),
    ("chi", "Chinese"),
    ("ara", "Arabic"),
    ("hin", "Hindi"),
    ("ben", "Bengali"),
    ("dut", "Dutch"),
    ("kor", "Korean"),
    ("pol", "Polish"),
    ("swe", "Swedish"),
    ("nor", "Norwegian"),
    ("dan", "Danish"),
    ("fin", "Finnish"),
    ("gre", "Greek"),
];

/// Image size suffix understood by the covers host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// `-S`.
    Small,
    /// `-M`.
    Medium,
    /// `-L`.
    Large,
}

impl ImageSize {
    const fn suffix(self) -> char {
        match self {
            Self::Small => 'S',
            Self::Medium => 'M',
            Self::Large => 'L',
        }
    }
}

/// Builds image URLs on the covers host.
///
/// # Examples
/// ```
/// use bookshelf::domain::enrichment::{CoverUrls, ImageSize};
///
/// let urls = CoverUrls::default();
/// assert_eq!(
///     urls.cover_by_id("8231856", ImageSize::Large),
///     "https://covers.openlibrary.org/b/id/8231856-L.jpg"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverUrls {
    base: String,
}

impl Default for CoverUrls {
    fn default() -> Self {
        Self::new(DEFAULT_COVERS_BASE_URL)
    }
}

impl CoverUrls {
    /// Use `base` as the covers host; a trailing slash is ignored.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    /// Cover image for an Open Library cover id.
    #[must_use]
    pub fn cover_by_id(&self, cover_id: &str, size: ImageSize) -> String {
        format!("{}/b/id/{cover_id}-{}.jpg", self.base, size.suffix())
    }

    /// Large cover image for an ISBN; dashes and spaces are removed.
    #[must_use]
    pub fn cover_by_isbn(&self, isbn: &str) -> String {
        let cleaned: String = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();
        format!("{}/b/isbn/{cleaned}-L.jpg", self.base)
    }

    /// Author portrait for an Open Library author id.
    #[must_use]
    pub fn author_image(&self, olid: &str, size: ImageSize) -> String {
        format!("{}/a/olid/{olid}-{}.jpg", self.base, size.suffix())
    }
}

/// Pick a cover id: `cover_i`, then the first of `covers`, then the cover
/// edition key.
#[must_use]
pub fn cover_id(work: &WorkSummary) -> Option<String> {
    work.cover_i
        .filter(|id| *id > 0)
        .or_else(|| work.covers.first().copied().filter(|id| *id > 0))
        .map(|id| id.to_string())
        .or_else(|| work.cover_edition_key.clone().filter(|key| !key.is_empty()))
}

/// Keep meaningful subject headings from the first ten.
///
/// Headings must be 3 to 49 characters, must not be reading-level or NYT
/// tags, and must not mention fiction unless they are exactly `fiction` or
/// `juvenile fiction`.
#[must_use]
pub fn categories_from_subjects(subjects: &[String]) -> Vec<String> {
    subjects
        .iter()
        .take(MAX_SUBJECTS_SCANNED)
        .map(|subject| subject.trim())
        .filter(|subject| keep_subject(subject))
        .map(str::to_owned)
        .collect()
}

fn keep_subject(subject: &str) -> bool {
    let lowered = subject.to_lowercase();
    if lowered == "fiction" || lowered == "juvenile fiction" {
        return true;
    }
    let length = subject.chars().count();
    length > 2
        && length < 50
        && !subject.starts_with("Reading Level")
        && !subject.starts_with("nyt:")
        && !lowered.contains("fiction")
}

/// English name for a MARC language code.
#[must_use]
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGE_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// Map up to five language codes to names, defaulting to English.
///
/// Unknown codes pass through unchanged.
#[must_use]
pub fn languages_from_codes(codes: &[String]) -> Vec<String> {
    if codes.is_empty() {
        return vec![DEFAULT_LANGUAGE.to_owned()];
    }
    codes
        .iter()
        .take(MAX_LANGUAGES)
        .map(|code| language_name(code).map_or_else(|| code.clone(), str::to_owned))
        .collect()
}

/// Work id without the `/works/` prefix.
#[must_use]
pub fn work_id(key: &str) -> String {
    key.replace("/works/", "")
}

/// Author id without the `/authors/` prefix.
#[must_use]
pub fn author_olid(key: &str) -> String {
    key.replace("/authors/", "")
}

/// Catalogue-ready view of a work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookCandidate {
    /// Title as published.
    pub title: String,
    /// All author names.
    pub authors: Vec<String>,
    /// Filtered subject headings.
    pub categories: Vec<String>,
    /// Year of first publication.
    pub publication_year: Option<i32>,
    /// Resolved cover id.
    pub cover_id: Option<String>,
    /// Language names.
    pub languages: Vec<String>,
    /// Work id without prefix.
    pub open_library_id: Option<String>,
}

impl BookCandidate {
    /// Apply the formatting rules to a work.
    #[must_use]
    pub fn from_work(work: &WorkSummary) -> Self {
        Self {
            title: work.title.clone(),
            authors: work.author_names.clone(),
            categories: categories_from_subjects(&work.subjects),
            publication_year: work.first_publish_year,
            cover_id: cover_id(work),
            languages: languages_from_codes(&work.languages),
            open_library_id: work.key.as_deref().map(work_id),
        }
    }

    /// First author, if any.
    #[must_use]
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// First language; always present after formatting.
    #[must_use]
    pub fn primary_language(&self) -> &str {
        self.languages.first().map_or(DEFAULT_LANGUAGE, String::as_str)
    }
}

/// Book lacking cover data, with names for display and searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverCandidate {
    /// Book id.
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Year of first publication.
    pub publication_year: Option<i32>,
    /// Work id.
    pub open_library_id: Option<String>,
    /// ISBN.
    pub isbn: Option<String>,
    /// Author names.
    pub authors: Vec<String>,
    /// Category names.
    pub categories: Vec<String>,
}

/// Tally of a backfill sweep over books or authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BackfillReport {
    /// Rows examined.
    pub processed: u32,
    /// Rows updated.
    pub updated: u32,
    /// Rows with no match or no image.
    pub not_found: u32,
    /// Rows that failed.
    pub errors: u32,
}

/// Tally of a search-driven import.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ImportReport {
    /// Works returned by the search.
    pub searched: u32,
    /// Books inserted.
    pub imported: u32,
    /// Works skipped because the book already exists.
    pub duplicates: u32,
    /// Works that failed.
    pub errors: u32,
    /// Ids of inserted books.
    pub books: Vec<BookId>,
}

/// Outcome of refreshing one book's cover URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverRefresh {
    /// Whether a cover was found and stored.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Stored cover URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl CoverRefresh {
    /// A cover was stored.
    #[must_use]
    pub fn updated(cover_url: String) -> Self {
        Self {
            success: true,
            message: "Cover updated successfully".to_owned(),
            cover_url: Some(cover_url),
        }
    }

    /// Nothing matched.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            success: false,
            message: "No cover found for this book".to_owned(),
            cover_url: None,
        }
    }
}

/// Outcome of refreshing cover URLs for every book lacking one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverSweepReport {
    /// Always true once the sweep ran.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Books examined.
    pub total_count: u32,
    /// Books updated.
    pub updated_count: u32,
}

impl CoverSweepReport {
    /// Summarise a finished sweep.
    #[must_use]
    pub fn new(total_count: u32, updated_count: u32) -> Self {
        Self {
            success: true,
            message: format!("Updated {updated_count} covers out of {total_count} books"),
            total_count,
            updated_count,
        }
    }
}

/// Outcome of setting an author portrait by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorImageUpdate {
    /// Always true when returned.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Stored URL.
    pub image_url: String,
}
