//! Extractor failures through the full router render the JSON error shape.

mod support;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use rstest::rstest;
use serde_json::Value;

use support::{app, http_state};

#[rstest]
#[case("/api/books/abc")]
#[case("/api/authors/abc")]
#[case("/api/collections/1.5")]
#[actix_web::test]
async fn unparsable_ids_are_invalid_requests(#[case] path: &str) {
    let app = test::init_service(app(http_state())).await;
    let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn login_body_of_unknown_type_is_an_invalid_request() {
    let app = test::init_service(app(http_state())).await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("username=bob_bookworm&password=password123")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}
