//! DTOs for decoding Open Library JSON responses.
//!
//! Open Library omits fields freely, so every field defaults. The adapter
//! decodes into these transport DTOs first, then maps into the port's
//! records in one pass.

use serde::Deserialize;

use crate::domain::ports::{AuthorMatch, EditionSummary, WorkDetails, WorkSummary};

/// `GET /search.json`.
#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto {
    #[serde(default)]
    pub(super) docs: Vec<SearchDocDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchDocDto {
    pub(super) key: Option<String>,
    #[serde(default)]
    pub(super) title: String,
    #[serde(default)]
    pub(super) author_name: Vec<String>,
    pub(super) first_publish_year: Option<i32>,
    pub(super) cover_i: Option<i64>,
    pub(super) cover_edition_key: Option<String>,
    #[serde(default)]
    pub(super) language: Vec<String>,
    #[serde(default)]
    pub(super) isbn: Vec<String>,
    #[serde(default)]
    pub(super) subject: Vec<String>,
}

impl From<SearchDocDto> for WorkSummary {
    fn from(doc: SearchDocDto) -> Self {
        Self {
            key: doc.key,
            title: doc.title,
            author_names: doc.author_name,
            first_publish_year: doc.first_publish_year,
            cover_i: doc.cover_i,
            covers: Vec::new(),
            cover_edition_key: doc.cover_edition_key,
            languages: doc.language,
            isbns: doc.isbn,
            subjects: doc.subject,
        }
    }
}

/// `GET {work_key}.json`.
#[derive(Debug, Deserialize)]
pub(super) struct WorkDto {
    #[serde(default)]
    pub(super) subjects: Vec<String>,
    #[serde(default)]
    pub(super) covers: Vec<i64>,
}

impl From<WorkDto> for WorkDetails {
    fn from(work: WorkDto) -> Self {
        Self {
            subjects: work.subjects,
            covers: work.covers.into_iter().filter(|id| *id > 0).collect(),
        }
    }
}

/// `GET {work_key}/editions.json`.
#[derive(Debug, Deserialize)]
pub(super) struct EditionsResponseDto {
    #[serde(default)]
    pub(super) entries: Vec<EditionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EditionDto {
    #[serde(default)]
    pub(super) languages: Vec<KeyRefDto>,
    pub(super) publish_date: Option<String>,
    #[serde(default)]
    pub(super) covers: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeyRefDto {
    pub(super) key: String,
}

impl From<EditionDto> for EditionSummary {
    fn from(edition: EditionDto) -> Self {
        Self {
            languages: edition
                .languages
                .into_iter()
                .filter_map(|lang| lang.key.rsplit('/').next().map(str::to_owned))
                .filter(|code| !code.is_empty())
                .collect(),
            publish_date: edition.publish_date,
            covers: edition.covers,
        }
    }
}

/// `GET /subjects/{subject}.json`.
#[derive(Debug, Deserialize)]
pub(super) struct SubjectResponseDto {
    #[serde(default)]
    pub(super) works: Vec<SubjectWorkDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SubjectWorkDto {
    pub(super) key: Option<String>,
    #[serde(default)]
    pub(super) title: String,
    #[serde(default)]
    pub(super) authors: Vec<NamedRefDto>,
    pub(super) first_publish_year: Option<i32>,
    pub(super) cover_id: Option<i64>,
    pub(super) cover_edition_key: Option<String>,
    #[serde(default)]
    pub(super) subject: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NamedRefDto {
    #[serde(default)]
    pub(super) name: String,
}

impl From<SubjectWorkDto> for WorkSummary {
    fn from(work: SubjectWorkDto) -> Self {
        Self {
            key: work.key,
            title: work.title,
            author_names: work
                .authors
                .into_iter()
                .map(|author| author.name)
                .filter(|name| !name.trim().is_empty())
                .collect(),
            first_publish_year: work.first_publish_year,
            cover_i: work.cover_id,
            covers: Vec::new(),
            cover_edition_key: work.cover_edition_key,
            languages: Vec::new(),
            isbns: Vec::new(),
            subjects: work.subject,
        }
    }
}

/// `GET /search/authors.json`.
#[derive(Debug, Deserialize)]
pub(super) struct AuthorSearchResponseDto {
    #[serde(default)]
    pub(super) docs: Vec<AuthorDocDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorDocDto {
    pub(super) key: Option<String>,
    #[serde(default)]
    pub(super) name: String,
}

impl AuthorDocDto {
    /// Search results carry a bare OLID; detail records prefix `/authors/`.
    pub(super) fn into_match(self) -> Option<AuthorMatch> {
        let key = self.key?;
        let olid = key.strip_prefix("/authors/").unwrap_or(&key).to_owned();
        if olid.is_empty() {
            return None;
        }
        Some(AuthorMatch {
            olid,
            name: self.name,
        })
    }
}
