//! Tests for the Open Library enrichment service.

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    AuthorMatch, BibliographicSourceError, MockAuthorRepository, MockBibliographicSource,
    MockBookRepository, WorkDetails,
};
use crate::domain::{Author, AuthorRef, Book, BookDetail, ErrorCode};

type Service =
    OpenLibraryEnrichment<MockBookRepository, MockAuthorRepository, MockBibliographicSource>;

fn make_service(
    books: MockBookRepository,
    authors: MockAuthorRepository,
    source: MockBibliographicSource,
) -> Service {
    OpenLibraryEnrichment::new(
        Arc::new(books),
        Arc::new(authors),
        Arc::new(source),
        CoverUrls::default(),
    )
}

fn dune_detail(isbn: Option<&str>) -> BookDetail {
    BookDetail {
        book: Book {
            id: BookId::new(1),
            title: "dune".to_owned(),
            publication_year: Some(1965),
            open_library_id: None,
            cover_id: None,
            cover_url: None,
            isbn: isbn.map(str::to_owned),
            created_at: Utc::now(),
        },
        authors: vec![AuthorRef {
            id: AuthorId::new(1),
            name: "frank herbert".to_owned(),
        }],
        categories: Vec::new(),
        languages: Vec::new(),
    }
}

fn candidate(id: i32, title: &str) -> CoverCandidate {
    CoverCandidate {
        id: BookId::new(id),
        title: title.to_owned(),
        publication_year: None,
        open_library_id: None,
        isbn: None,
        authors: vec!["someone".to_owned()],
        categories: Vec::new(),
    }
}

#[tokio::test]
async fn refresh_cover_prefers_the_isbn_image() {
    let mut books = MockBookRepository::new();
    books
        .expect_find()
        .return_once(|_| Ok(Some(dune_detail(Some("978-0441172719")))));
    books
        .expect_set_cover_url()
        .withf(|id, url| {
            *id == BookId::new(1) && url == "https://covers.openlibrary.org/b/isbn/9780441172719-L.jpg"
        })
        .times(1)
        .return_once(|_, _| Ok(true));
    let mut source = MockBibliographicSource::new();
    source.expect_image_exists().times(1).return_once(|_| Ok(true));
    source.expect_search_works().times(0);

    let refresh = make_service(books, MockAuthorRepository::new(), source)
        .refresh_book_cover(BookId::new(1))
        .await
        .expect("refresh succeeds");
    assert!(refresh.success);
    assert_eq!(refresh.message, "Cover updated successfully");
}

#[tokio::test]
async fn refresh_cover_falls_back_to_title_and_author_search() {
    let mut books = MockBookRepository::new();
    books.expect_find().return_once(|_| Ok(Some(dune_detail(None))));
    books
        .expect_set_cover_url()
        .withf(|_, url| url == "https://covers.openlibrary.org/b/id/8231856-L.jpg")
        .times(1)
        .return_once(|_, _| Ok(true));
    let mut source = MockBibliographicSource::new();
    source
        .expect_search_works()
        .withf(|query: &WorkQuery| {
            query.title == "dune" && query.author.as_deref() == Some("frank herbert")
        })
        .times(1)
        .return_once(|_| {
            Ok(vec![WorkSummary {
                title: "Dune".to_owned(),
                cover_i: Some(8_231_856),
                ..WorkSummary::default()
            }])
        });
    source.expect_image_exists().return_once(|_| Ok(true));

    let refresh = make_service(books, MockAuthorRepository::new(), source)
        .refresh_book_cover(BookId::new(1))
        .await
        .expect("refresh succeeds");
    assert_eq!(
        refresh.cover_url.as_deref(),
        Some("https://covers.openlibrary.org/b/id/8231856-L.jpg")
    );
}

#[tokio::test]
async fn refresh_cover_reports_when_nothing_matches() {
    let mut books = MockBookRepository::new();
    books.expect_find().return_once(|_| Ok(Some(dune_detail(None))));
    books.expect_set_cover_url().times(0);
    let mut source = MockBibliographicSource::new();
    source
        .expect_search_works()
        .return_once(|_| Err(BibliographicSourceError::timeout("10s")));

    let refresh = make_service(books, MockAuthorRepository::new(), source)
        .refresh_book_cover(BookId::new(1))
        .await
        .expect("refresh completes");
    assert!(!refresh.success);
    assert_eq!(refresh.message, "No cover found for this book");
}

#[tokio::test]
async fn refresh_cover_for_missing_book_is_not_found() {
    let mut books = MockBookRepository::new();
    books.expect_find().return_once(|_| Ok(None));

    let err = make_service(
        books,
        MockAuthorRepository::new(),
        MockBibliographicSource::new(),
    )
    .refresh_book_cover(BookId::new(7))
    .await
    .expect_err("missing book");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Book not found");
}

#[tokio::test]
async fn cover_id_backfill_tallies_each_outcome() {
    let mut books = MockBookRepository::new();
    books.expect_without_cover_ids().with(eq(None)).return_once(|_| {
        Ok(vec![
            candidate(1, "found"),
            candidate(2, "missing"),
            candidate(3, "broken"),
        ])
    });
    books
        .expect_set_cover_id()
        .withf(|id, cover| *id == BookId::new(1) && cover == "42")
        .times(1)
        .return_once(|_, _| Ok(true));
    let mut source = MockBibliographicSource::new();
    source
        .expect_search_works()
        .returning(|query: &WorkQuery| match query.title.as_str() {
            "found" => Ok(vec![WorkSummary {
                cover_i: Some(42),
                ..WorkSummary::default()
            }]),
            "missing" => Ok(Vec::new()),
            _ => Err(BibliographicSourceError::transport("reset")),
        });
    source.expect_image_exists().returning(|_| Ok(true));

    let report = make_service(books, MockAuthorRepository::new(), source)
        .backfill_cover_ids()
        .await
        .expect("backfill runs");
    assert_eq!(
        report,
        BackfillReport {
            processed: 3,
            updated: 1,
            not_found: 1,
            errors: 1,
        }
    );
}

#[tokio::test]
async fn author_image_backfill_stores_portrait_urls() {
    let mut authors = MockAuthorRepository::new();
    authors.expect_missing_images().return_once(|| {
        Ok(vec![Author {
            id: AuthorId::new(3),
            name: "ursula k. le guin".to_owned(),
            image_url: None,
        }])
    });
    authors
        .expect_set_image_url()
        .withf(|id, url| {
            *id == AuthorId::new(3) && url == "https://covers.openlibrary.org/a/olid/OL26320A-M.jpg"
        })
        .times(1)
        .return_once(|id, url| {
            Ok(Some(Author {
                id,
                name: "ursula k. le guin".to_owned(),
                image_url: Some(url.to_owned()),
            }))
        });
    let mut source = MockBibliographicSource::new();
    source.expect_search_author().return_once(|_| {
        Ok(Some(AuthorMatch {
            olid: "/authors/OL26320A".to_owned(),
            name: "Ursula K. Le Guin".to_owned(),
        }))
    });
    source.expect_image_exists().return_once(|_| Ok(true));

    let report = make_service(MockBookRepository::new(), authors, source)
        .backfill_author_images()
        .await
        .expect("backfill runs");
    assert_eq!(report.processed, 1);
    assert_eq!(report.updated, 1);
}

#[rstest]
#[case("", "Image URL is required")]
#[case("ftp://example.com/a.jpg", "Image URL must start with http:// or https://")]
#[tokio::test]
async fn manual_author_images_are_validated(#[case] url: &str, #[case] message: &str) {
    let err = make_service(
        MockBookRepository::new(),
        MockAuthorRepository::new(),
        MockBibliographicSource::new(),
    )
    .set_author_image(AuthorId::new(1), url)
    .await
    .expect_err("invalid url");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), message);
}

#[tokio::test]
async fn manual_author_image_reports_the_author() {
    let mut authors = MockAuthorRepository::new();
    authors.expect_set_image_url().return_once(|id, url| {
        Ok(Some(Author {
            id,
            name: "octavia butler".to_owned(),
            image_url: Some(url.to_owned()),
        }))
    });

    let update = make_service(MockBookRepository::new(), authors, MockBibliographicSource::new())
        .set_author_image(AuthorId::new(2), " https://img.example/ob.jpg ")
        .await
        .expect("update succeeds");
    assert_eq!(update.message, "Updated image URL for octavia butler");
    assert_eq!(update.image_url, "https://img.example/ob.jpg");
}

#[tokio::test]
async fn import_counts_duplicates_and_new_books() {
    let mut books = MockBookRepository::new();
    books
        .expect_find_duplicate()
        .returning(|book: &NewBook| {
            Ok((book.title == "dune").then_some(BookId::new(1)))
        });
    books
        .expect_create()
        .withf(|book: &NewBook| {
            book.title == "dune messiah"
                && book.authors.names == vec!["frank herbert".to_owned()]
                && book.languages.names == vec!["english".to_owned()]
                && book.open_library_id.as_deref() == Some("OL893415W")
        })
        .times(1)
        .return_once(|_| Ok(BookId::new(2)));
    let mut source = MockBibliographicSource::new();
    source.expect_search_works().return_once(|_| {
        Ok(vec![
            WorkSummary {
                key: Some("/works/OL893415W".to_owned()),
                title: "Dune Messiah".to_owned(),
                author_names: vec!["Frank Herbert".to_owned()],
                ..WorkSummary::default()
            },
            WorkSummary {
                key: Some("/works/OL45883W".to_owned()),
                title: "Dune".to_owned(),
                ..WorkSummary::default()
            },
        ])
    });
    source
        .expect_work_details()
        .returning(|_| Ok(WorkDetails::default()));

    let report = make_service(books, MockAuthorRepository::new(), source)
        .import_from_search("dune", 10)
        .await
        .expect("import runs");
    assert_eq!(report.searched, 2);
    assert_eq!(report.imported, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.books, vec![BookId::new(2)]);
}

#[tokio::test]
async fn import_requires_a_query() {
    let err = make_service(
        MockBookRepository::new(),
        MockAuthorRepository::new(),
        MockBibliographicSource::new(),
    )
    .import_from_search("  ", 10)
    .await
    .expect_err("blank query");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn cover_url_sweep_counts_updates() {
    let mut books = MockBookRepository::new();
    books.expect_without_cover_urls().return_once(|| {
        Ok(vec![
            CoverCandidate {
                isbn: Some("123".to_owned()),
                ..candidate(1, "one")
            },
            candidate(2, "two"),
        ])
    });
    books
        .expect_set_cover_url()
        .withf(|id, url| {
            *id == BookId::new(1) && url == "https://covers.openlibrary.org/b/isbn/123-L.jpg"
        })
        .times(1)
        .return_once(|_, _| Ok(true));
    let mut source = MockBibliographicSource::new();
    source.expect_image_exists().returning(|_| Ok(true));
    source.expect_search_works().returning(|_| Ok(Vec::new()));

    let report = make_service(books, MockAuthorRepository::new(), source)
        .refresh_missing_cover_urls()
        .await
        .expect("sweep runs");
    assert_eq!(report.total_count, 2);
    assert_eq!(report.updated_count, 1);
    assert_eq!(report.message, "Updated 1 covers out of 2 books");
}
