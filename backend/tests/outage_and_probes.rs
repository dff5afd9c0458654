//! Probe endpoints, the landing page and database outage reporting.

mod support;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use rstest::rstest;
use serde_json::Value;

use bookshelf::domain::TRACE_ID_HEADER;
use support::{app, http_state, login};

#[rstest]
#[case("/health/ready")]
#[case("/health/live")]
#[actix_web::test]
async fn probes_report_ready(#[case] path: &str) {
    let app = test::init_service(app(http_state())).await;
    let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn landing_page_is_plain_text() {
    let app = test::init_service(app(http_state())).await;
    let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    let body = test::read_body(response).await;
    assert_eq!(body.as_ref(), b"Welcome to the Books Manager");
}

#[rstest]
#[case("/api/books")]
#[case("/api/authors")]
#[case("/api/collections")]
#[actix_web::test]
async fn unreachable_database_returns_service_unavailable(#[case] path: &str) {
    let app = test::init_service(app(http_state())).await;
    let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let header_trace = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "service_unavailable");
    assert_eq!(body["traceId"], header_trace);
}

#[actix_web::test]
async fn enrichment_outage_is_reported_to_admins() {
    let app = test::init_service(app(http_state())).await;
    let admin = login(&app, "alice_reader").await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/backfill/covers")
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn dashboard_counts_come_from_the_stats_port() {
    let app = test::init_service(app(http_state())).await;
    let admin = login(&app, "alice_reader").await;
    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/admin/dashboard")
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(body["users"], 2);
}
