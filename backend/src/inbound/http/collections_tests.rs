//! Tests for the collection endpoints.

use super::*;
use crate::domain::ports::RepositoryError;
use crate::domain::{Collection, Role};
use crate::inbound::http::test_utils::{MockPorts, admin, reader, sample_book, sign_in, test_app};
use actix_web::http::StatusCode;
use actix_web::test;
use pagination::Page;
use rstest::rstest;
use serde_json::Value;

fn mount(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").service(scope()));
}

fn owned_by(owner: UserId) -> CollectionSummary {
    CollectionSummary {
        collection: Collection {
            id: CollectionId::new(10),
            name: "summer reads".to_owned(),
            description: None,
            user_id: owner,
            created_at: chrono::Utc::now(),
        },
        owner_username: "carol_critic".to_owned(),
        book_count: 3,
    }
}

#[actix_web::test]
async fn list_filters_by_owner() {
    let mut ports = MockPorts::default();
    ports
        .collections
        .expect_list()
        .withf(|filter, _| filter.owner == Some(UserId::new(2)) && filter.search.is_none())
        .returning(|_, page| Ok(Page::new(vec![owned_by(UserId::new(2))], page, 1)));
    let app = test::init_service(test_app(ports.into_state(), mount)).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/collections?user_id=2").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"][0]["owner_username"], "carol_critic");
    assert_eq!(body["data"][0]["book_count"], 3);
}

#[actix_web::test]
async fn create_defaults_the_owner_to_the_caller() {
    let mut ports = MockPorts::default();
    ports
        .collections
        .expect_create()
        .withf(|collection| {
            collection.owner() == reader().id
                && collection.name() == "summer reads"
                && collection.description() == Some("Beach books")
        })
        .returning(|_| Ok(CollectionId::new(10)));
    let app = test::init_service(test_app(ports.into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/collections")
            .cookie(cookie)
            .set_json(json!({"name": "Summer Reads", "description": " Beach books "}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({"message": "Collection added", "collection_id": 10}));
}

#[actix_web::test]
async fn users_cannot_create_for_others() {
    let app = test::init_service(test_app(MockPorts::default().into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/collections")
            .cookie(cookie)
            .set_json(json!({"name": "Stolen", "user_id": admin().id}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_create_on_behalf_of_users() {
    let mut ports = MockPorts::default();
    ports
        .collections
        .expect_create()
        .withf(|collection| collection.owner() == UserId::new(4))
        .returning(|_| Ok(CollectionId::new(11)));
    let app = test::init_service(test_app(ports.into_state(), mount)).await;
    let cookie = sign_in(&app, Role::Admin).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/collections")
            .cookie(cookie)
            .set_json(json!({"name": "For David", "user_id": 4}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn anonymous_create_is_401() {
    let app = test::init_service(test_app(MockPorts::default().into_state(), mount)).await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/collections")
            .set_json(json!({"name": "Nope"}))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_requires_a_name() {
    let app = test::init_service(test_app(MockPorts::default().into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/collections")
            .cookie(cookie)
            .set_json(json!({"description": "no name"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "Name is required");
}

#[rstest]
#[case(Role::User, 2, StatusCode::OK)]
#[case(Role::User, 3, StatusCode::FORBIDDEN)]
#[case(Role::Admin, 3, StatusCode::OK)]
#[actix_web::test]
async fn only_owners_and_admins_update(
    #[case] role: Role,
    #[case] owner: i32,
    #[case] expected: StatusCode,
) {
    let mut ports = MockPorts::default();
    ports
        .collections
        .expect_find()
        .returning(move |_| Ok(Some(owned_by(UserId::new(owner)))));
    ports
        .collections
        .expect_update()
        .withf(|_, changes| changes.name().is_none() && changes.description() == Some("beach"))
        .returning(|_, _| Ok(true));
    let app = test::init_service(test_app(ports.into_state(), mount)).await;
    let cookie = sign_in(&app, role).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/collections/10")
            .cookie(cookie)
            .set_json(json!({"description": "beach"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[actix_web::test]
async fn empty_update_is_rejected_before_lookup() {
    let app = test::init_service(test_app(MockPorts::default().into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/collections/10")
            .cookie(cookie)
            .set_json(json!({"name": "  "}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body["message"],
        "At least one field (name or description) is required"
    );
}

#[actix_web::test]
async fn deleting_a_missing_collection_is_404() {
    let mut ports = MockPorts::default();
    ports.collections.expect_find().returning(|_| Ok(None));
    let app = test::init_service(test_app(ports.into_state(), mount)).await;
    let cookie = sign_in(&app, Role::Admin).await;

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/collections/10")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "Collection not found");
}

#[rstest]
#[case(0, StatusCode::NOT_FOUND)]
#[case(1, StatusCode::OK)]
#[actix_web::test]
async fn collection_books_404_when_empty(#[case] total: u64, #[case] expected: StatusCode) {
    let mut ports = MockPorts::default();
    ports
        .books
        .expect_list()
        .withf(|filter, _| filter.collection_id == Some(CollectionId::new(10)))
        .returning(move |_, page| {
            let data = if total == 0 {
                Vec::new()
            } else {
                vec![sample_book(1, "the hobbit")]
            };
            Ok(Page::new(data, page, total))
        });
    let app = test::init_service(test_app(ports.into_state(), mount)).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/collections/10/books").to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[rstest]
#[case(MembershipChange::Applied, StatusCode::CREATED)]
#[case(MembershipChange::BookMissing, StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn adding_a_book_reports_missing_books(
    #[case] change: MembershipChange,
    #[case] expected: StatusCode,
) {
    let mut ports = MockPorts::default();
    ports
        .collections
        .expect_find()
        .returning(|_| Ok(Some(owned_by(reader().id))));
    ports
        .collections
        .expect_add_book()
        .withf(|id, book| *id == CollectionId::new(10) && *book == BookId::new(7))
        .returning(move |_, _| Ok(change));
    let app = test::init_service(test_app(ports.into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/collections/10/books")
            .cookie(cookie)
            .set_json(json!({"book_id": 7}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[actix_web::test]
async fn replace_needs_a_list() {
    let app = test::init_service(test_app(MockPorts::default().into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/collections/10/books")
            .cookie(cookie)
            .set_json(json!({}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "book_ids must be a list");
}

#[actix_web::test]
async fn replace_passes_every_id() {
    let mut ports = MockPorts::default();
    ports
        .collections
        .expect_find()
        .returning(|_| Ok(Some(owned_by(reader().id))));
    ports
        .collections
        .expect_replace_books()
        .withf(|_, books| *books == [BookId::new(7), BookId::new(8)])
        .returning(|_, _| Ok(MembershipChange::Applied));
    let app = test::init_service(test_app(ports.into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/collections/10/books")
            .cookie(cookie)
            .set_json(json!({"book_ids": [7, 8]}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[case(Ok(true), StatusCode::OK)]
#[case(Ok(false), StatusCode::NOT_FOUND)]
#[case(Err(RepositoryError::query("boom")), StatusCode::INTERNAL_SERVER_ERROR)]
#[actix_web::test]
async fn removing_a_book_reports_the_outcome(
    #[case] outcome: Result<bool, RepositoryError>,
    #[case] expected: StatusCode,
) {
    let mut ports = MockPorts::default();
    ports
        .collections
        .expect_find()
        .returning(|_| Ok(Some(owned_by(reader().id))));
    ports
        .collections
        .expect_remove_book()
        .return_once(move |_, _| outcome);
    let app = test::init_service(test_app(ports.into_state(), mount)).await;
    let cookie = sign_in(&app, Role::User).await;

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/collections/10/books/7")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}
