//! Demo catalogue seeding.
//!
//! Wipes the catalogue, creates the demo accounts, pulls works for a list of
//! subjects from the bibliographic source and files random books into
//! per-user collections. Randomness is injected so a fixed seed reproduces a
//! run.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::domain::enrichment::{language_name, work_id};
use crate::domain::ports::{
    BibliographicSource, BookRepository, CatalogueMaintenance, CollectionRepository,
    EditionSummary, RepositoryError, UserRepository, WorkDetails, WorkSummary, repository_error,
};
use crate::domain::text::{normalize, normalize_all};
use crate::domain::{
    BookId, Error, Links, NewBook, NewCollection, NewUser, PasswordHash, Resource, Role, UserId,
};

/// Password shared by every demo account.
pub const SEED_PASSWORD: &str = "password123";

/// Demo accounts as `(username, email, role)`.
pub const SEED_USERS: &[(&str, &str, Role)] = &[
    ("alice_reader", "alice@example.com", Role::Admin),
    ("bob_bookworm", "bob@example.com", Role::User),
    ("carol_critic", "carol@example.com", Role::User),
    ("david_scholar", "david@example.com", Role::User),
];

/// Subject slugs fetched in order until the target is reached.
pub const SEED_SUBJECTS: &[&str] = &[
    "science_fiction",
    "mystery",
    "romance",
    "biography",
    "history",
    "philosophy",
    "psychology",
    "business",
    "health",
    "cooking",
    "art",
    "music",
    "travel",
    "technology",
    "education",
];

/// Collection names drawn for each user.
pub const COLLECTION_TYPES: &[&str] = &[
    "Favorites",
    "Currently Reading",
    "Want to Read",
    "Classics",
    "Science Fiction",
    "Mystery & Thriller",
    "Romance",
    "History",
    "Biography",
    "Self-Help",
    "Fiction",
    "Non-Fiction",
];

const MAX_AUTHORS: usize = 3;
const MAX_CATEGORIES: usize = 5;
const MAX_LANGUAGES: usize = 3;
const UNKNOWN_AUTHOR: &str = "Unknown Author";
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_LANGUAGE: &str = "English";
const EXCLUDED_SUBJECT_PREFIXES: &[&str] = &["Reading Level", "nyt:", "Times reviewed"];
const EXCLUDED_SUBJECT_PHRASES: &[&str] = &["accessible book", "protected daisy"];

/// How much to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    /// Subject slugs to walk.
    pub subjects: Vec<String>,
    /// Works requested per subject.
    pub works_per_subject: u32,
    /// Stop fetching once this many books are prepared.
    pub target_books: usize,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            subjects: SEED_SUBJECTS.iter().map(|s| (*s).to_owned()).collect(),
            works_per_subject: 8,
            target_books: 100,
        }
    }
}

/// Counts from a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    /// Accounts created.
    pub users: usize,
    /// Books inserted.
    pub books: usize,
    /// Works skipped because the title was already present.
    pub duplicates: usize,
    /// Works that failed to insert.
    pub errors: usize,
    /// Collections created.
    pub collections: usize,
}

/// Up to three author names, or a placeholder.
#[must_use]
pub fn seed_authors(work: &WorkSummary) -> Vec<String> {
    let names = normalize_all(
        work.author_names
            .iter()
            .map(String::as_str)
            .take(MAX_AUTHORS),
    );
    if names.is_empty() {
        normalize_all([UNKNOWN_AUTHOR])
    } else {
        names
    }
}

fn keep_seed_subject(subject: &str) -> bool {
    let length = subject.chars().count();
    let lowered = subject.to_lowercase();
    length > 2
        && length < 50
        && !EXCLUDED_SUBJECT_PREFIXES
            .iter()
            .any(|prefix| subject.starts_with(prefix))
        && !EXCLUDED_SUBJECT_PHRASES
            .iter()
            .any(|phrase| lowered.contains(phrase))
}

/// Up to five subjects from the search hit and the full record, or `General`.
#[must_use]
pub fn seed_categories(work: &WorkSummary, details: &WorkDetails) -> Vec<String> {
    let kept = work
        .subjects
        .iter()
        .chain(&details.subjects)
        .map(|subject| subject.trim())
        .filter(|subject| keep_seed_subject(subject));
    let mut names = normalize_all(kept);
    names.truncate(MAX_CATEGORIES);
    if names.is_empty() {
        normalize_all([DEFAULT_CATEGORY])
    } else {
        names
    }
}

fn capitalise(code: &str) -> String {
    let mut chars = code.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Up to three edition languages by name, or `English`.
#[must_use]
pub fn seed_languages(edition: Option<&EditionSummary>) -> Vec<String> {
    let named: Vec<String> = edition
        .map(|edition| edition.languages.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|code| language_name(code).map_or_else(|| capitalise(code), str::to_owned))
        .collect();
    let mut names = normalize_all(named.iter().map(String::as_str));
    names.truncate(MAX_LANGUAGES);
    if names.is_empty() {
        normalize_all([DEFAULT_LANGUAGE])
    } else {
        names
    }
}

fn leading_year(date: &str) -> Option<i32> {
    let prefix = date.get(..4)?;
    if prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}

/// First publication year, the edition's year, or a random year in 1950..=2023.
pub fn seed_publication_year<R: Rng>(
    work: &WorkSummary,
    edition: Option<&EditionSummary>,
    rng: &mut R,
) -> i32 {
    work.first_publish_year
        .or_else(|| {
            edition
                .and_then(|edition| edition.publish_date.as_deref())
                .and_then(leading_year)
        })
        .unwrap_or_else(|| rng.gen_range(1950..=2023))
}

/// First cover from the full record, then the edition, then the search hit.
#[must_use]
pub fn seed_cover_id(
    work: &WorkSummary,
    details: &WorkDetails,
    edition: Option<&EditionSummary>,
) -> Option<String> {
    let edition_covers = edition.map(|edition| edition.covers.as_slice());
    [
        details.covers.first(),
        edition_covers.and_then(<[i64]>::first),
        work.cover_i.as_ref().or_else(|| work.covers.first()),
    ]
    .into_iter()
    .flatten()
    .find(|id| **id > 0)
    .map(ToString::to_string)
}

/// Build the book for one work; `None` when the title is blank.
pub fn seed_book<R: Rng>(
    work: &WorkSummary,
    details: &WorkDetails,
    edition: Option<&EditionSummary>,
    rng: &mut R,
) -> Option<NewBook> {
    let title = normalize(&work.title)?;
    Some(NewBook {
        title,
        publication_year: Some(seed_publication_year(work, edition, rng)),
        open_library_id: work.key.as_deref().map(work_id),
        cover_id: seed_cover_id(work, details, edition),
        authors: Links::from_names(seed_authors(work)),
        categories: Links::from_names(seed_categories(work, details)),
        languages: Links::from_names(seed_languages(edition)),
        ..NewBook::default()
    })
}

/// Populates an empty catalogue with demo data.
pub struct CatalogueSeeder<M: ?Sized, U: ?Sized, B: ?Sized, C: ?Sized, S: ?Sized> {
    maintenance: Arc<M>,
    users: Arc<U>,
    books: Arc<B>,
    collections: Arc<C>,
    source: Arc<S>,
}

impl<M, U, B, C, S> CatalogueSeeder<M, U, B, C, S>
where
    M: CatalogueMaintenance + ?Sized,
    U: UserRepository + ?Sized,
    B: BookRepository + ?Sized,
    C: CollectionRepository + ?Sized,
    S: BibliographicSource + ?Sized,
{
    /// Create a seeder over the given ports.
    pub fn new(
        maintenance: Arc<M>,
        users: Arc<U>,
        books: Arc<B>,
        collections: Arc<C>,
        source: Arc<S>,
    ) -> Self {
        Self {
            maintenance,
            users,
            books,
            collections,
            source,
        }
    }

    /// Reset the catalogue and fill it.
    ///
    /// # Errors
    ///
    /// Fails when the reset, an account insert or a collection insert fails.
    /// Individual works that cannot be fetched or stored are skipped.
    pub async fn run<R: Rng + Send>(
        &self,
        plan: &SeedPlan,
        rng: &mut R,
    ) -> Result<SeedReport, Error> {
        self.maintenance
            .reset()
            .await
            .map_err(repository_error(Resource::Book))?;
        info!("catalogue cleared");

        let mut report = SeedReport::default();
        let owners = self.create_users().await?;
        report.users = owners.len();

        let drafts = self.fetch_books(plan, rng).await;
        let book_ids = self.insert_books(&drafts, &mut report).await;
        report.collections = self.create_collections(&owners, &book_ids, rng).await?;

        info!(
            users = report.users,
            books = report.books,
            duplicates = report.duplicates,
            errors = report.errors,
            collections = report.collections,
            "seeding finished"
        );
        Ok(report)
    }

    async fn create_users(&self) -> Result<Vec<UserId>, Error> {
        let mut ids = Vec::with_capacity(SEED_USERS.len());
        for (username, email, role) in SEED_USERS {
            let user = self
                .users
                .create(&NewUser {
                    username: (*username).to_owned(),
                    email: (*email).to_owned(),
                    password_hash: PasswordHash::from_password(SEED_PASSWORD),
                    role: *role,
                })
                .await
                .map_err(repository_error(Resource::User))?;
            ids.push(user.id);
        }
        Ok(ids)
    }

    async fn fetch_books<R: Rng + Send>(&self, plan: &SeedPlan, rng: &mut R) -> Vec<NewBook> {
        let mut drafts = Vec::new();
        for subject in &plan.subjects {
            if drafts.len() >= plan.target_books {
                break;
            }
            let works = match self
                .source
                .subject_works(subject, plan.works_per_subject)
                .await
            {
                Ok(works) => works,
                Err(err) => {
                    warn!(subject = %subject, error = %err, "subject fetch failed");
                    continue;
                }
            };
            info!(subject = %subject, works = works.len(), "subject fetched");
            for work in works {
                if drafts.len() >= plan.target_books {
                    break;
                }
                let (details, edition) = self.work_records(&work).await;
                if let Some(book) = seed_book(&work, &details, edition.as_ref(), rng) {
                    drafts.push(book);
                }
            }
        }
        drafts
    }

    async fn work_records(&self, work: &WorkSummary) -> (WorkDetails, Option<EditionSummary>) {
        let Some(key) = work.key.as_deref() else {
            return (WorkDetails::default(), None);
        };
        let details = self.source.work_details(key).await.unwrap_or_else(|err| {
            warn!(key, error = %err, "work details unavailable");
            WorkDetails::default()
        });
        let edition = self.source.first_edition(key).await.unwrap_or_else(|err| {
            warn!(key, error = %err, "edition unavailable");
            None
        });
        (details, edition)
    }

    async fn insert_books(&self, drafts: &[NewBook], report: &mut SeedReport) -> Vec<BookId> {
        let mut ids = Vec::with_capacity(drafts.len());
        for book in drafts {
            match self.books.create(book).await {
                Ok(id) => ids.push(id),
                Err(RepositoryError::Conflict { .. }) => report.duplicates += 1,
                Err(err) => {
                    warn!(title = %book.title, error = %err, "book insert failed");
                    report.errors += 1;
                }
            }
        }
        report.books = ids.len();
        ids
    }

    async fn create_collections<R: Rng + Send>(
        &self,
        owners: &[UserId],
        books: &[BookId],
        rng: &mut R,
    ) -> Result<usize, Error> {
        let mut created = 0;
        for owner in owners {
            let count = rng.gen_range(2..=4);
            let names: Vec<&str> = COLLECTION_TYPES
                .choose_multiple(rng, count)
                .copied()
                .collect();
            for name in names {
                let description = format!("My {name} collection");
                let draft = NewCollection::try_new(Some(name), Some(&description), *owner)
                    .map_err(|err| Error::internal(err.to_string()))?;
                let id = self
                    .collections
                    .create(&draft)
                    .await
                    .map_err(repository_error(Resource::Collection))?;
                let wanted = rng.gen_range(3..=10).min(books.len());
                let picked: Vec<BookId> = books.choose_multiple(rng, wanted).copied().collect();
                self.collections
                    .replace_books(id, &picked)
                    .await
                    .map_err(repository_error(Resource::Collection))?;
                created += 1;
            }
        }
        Ok(created)
    }
}
