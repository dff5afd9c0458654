//! Plain-text landing response for `/`.

use actix_web::{HttpResponse, get};

/// Body served at `/`.
pub const WELCOME: &str = "Welcome to the Books Manager";

/// Landing text.
#[utoipa::path(
    get,
    path = "/",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Welcome text", content_type = "text/plain", body = String))
)]
#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(WELCOME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};

    #[actix_web::test]
    async fn root_greets_in_plain_text() {
        let app = test::init_service(App::new().service(index)).await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(test::read_body(response).await, WELCOME.as_bytes());
    }
}
