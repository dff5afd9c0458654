//! HTTP inbound adapter exposing the catalogue REST endpoints.
//!
//! [`configure`] mounts every route: the JSON API under `/api`, session
//! endpoints under `/auth`, the landing text at `/` and the health probes.
//! Callers supply [`state::HttpState`], [`health::HealthState`] and a session
//! middleware.

pub mod access;
pub mod admin;
pub mod auth;
pub mod authors;
pub mod books;
pub mod cache_control;
pub mod collections;
pub mod error;
pub mod frontend;
pub mod health;
pub mod index;
pub mod payloads;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod taxonomy;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Routes mounted under `/api`.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .service(books::scope())
        .service(authors::scope())
        .configure(taxonomy::configure)
        .service(collections::scope())
        .service(users::scope())
        .service(frontend::scope())
        .service(admin::scope())
}

/// Mount every HTTP route and the JSON/query error handlers.
///
/// # Examples
/// ```ignore
/// App::new()
///     .app_data(http_state)
///     .app_data(health_state)
///     .wrap(session)
///     .configure(bookshelf::inbound::http::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .app_data(web::FormConfig::default().error_handler(error::form_error_handler))
        .service(api_scope())
        .service(auth::scope())
        .service(health::ready)
        .service(health::live)
        .service(index::index);
}
