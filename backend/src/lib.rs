//! Book catalogue backend.
//!
//! Hexagonal layout: `domain` holds entities, validation, ports and the
//! account, enrichment and seeding services; `inbound::http` adapts them to
//! Actix handlers; `outbound` implements the driven ports over PostgreSQL and
//! Open Library.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
