//! Sign-up, sign-in and sign-out through the full router.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use support::{app, http_state, login, session_cookie};

#[actix_web::test]
async fn signup_starts_a_session_that_logout_ends() {
    let app = test::init_service(app(http_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "secret1",
                "password_confirm": "secret1"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response).expect("signup sets a session cookie");
    let created: Value = test::read_body_json(response).await;
    assert_eq!(created["username"], "carol");
    assert_eq!(created["role"], "user");

    let me: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/me")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(me["email"], "carol@example.com");

    let profile: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/profile")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(profile["username"], "carol");
    assert_eq!(profile["collection_count"], 0);

    let bye: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/auth/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(bye["message"], "Goodbye, carol! You have been logged out.");
}

#[actix_web::test]
async fn login_accepts_an_email_address() {
    let app = test::init_service(app(http_state())).await;
    let cookie = login(&app, "bob@example.com").await;

    let me: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me["username"], "bob_bookworm");
}

#[rstest]
#[case("alice_reader", "wrong-password")]
#[case("nobody", "password123")]
#[actix_web::test]
async fn bad_credentials_are_unauthorised(#[case] username: &str, #[case] password: &str) {
    let app = test::init_service(app(http_state())).await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": username, "password": password}))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn duplicate_signup_conflicts() {
    let app = test::init_service(app(http_state())).await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "bob_bookworm",
                "email": "bob@example.com",
                "password": "secret1",
                "password_confirm": "secret1"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "Username or email already exists");
}

#[actix_web::test]
async fn me_requires_a_session() {
    let app = test::init_service(app(http_state())).await;
    let response =
        test::call_service(&app, test::TestRequest::get().uri("/auth/me").to_request()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
