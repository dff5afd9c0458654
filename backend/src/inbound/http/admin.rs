//! Admin dashboard and Open Library maintenance endpoints.
//!
//! ```text
//! GET  /api/admin/dashboard
//! GET  /api/admin/books-without-covers
//! POST /api/admin/backfill/covers
//! POST /api/admin/backfill/author-images
//! POST /api/admin/import            {"query":"dune","limit":10}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::repository_error;
use crate::domain::{BackfillReport, CoverCandidate, DashboardCounts, Error, Resource};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::AdminUser;
use crate::inbound::http::schemas::{
    BackfillReportSchema, CoverCandidateSchema, DashboardCountsSchema, ErrorSchema,
    ImportReportSchema,
};
use crate::inbound::http::state::HttpState;

/// Results requested from Open Library when `limit` is absent.
pub const DEFAULT_IMPORT_LIMIT: u32 = 10;
/// Largest accepted `limit`.
pub const MAX_IMPORT_LIMIT: u32 = 100;

/// Search-driven import body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ImportRequest {
    #[schema(example = "dune")]
    pub query: Option<String>,
    #[schema(example = 10, minimum = 1, maximum = 100)]
    pub limit: Option<u32>,
}

impl ImportRequest {
    fn limit(&self) -> Result<u32, Error> {
        match self.limit.unwrap_or(DEFAULT_IMPORT_LIMIT) {
            limit @ 1..=MAX_IMPORT_LIMIT => Ok(limit),
            _ => Err(Error::invalid_request(format!(
                "limit must be between 1 and {MAX_IMPORT_LIMIT}"
            ))),
        }
    }
}

/// Catalogue-wide totals.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Totals", body = DashboardCountsSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDashboard",
    security(("SessionCookie" = []))
)]
#[get("/dashboard")]
pub async fn dashboard(
    _admin: AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<DashboardCounts>> {
    let counts = state
        .stats
        .dashboard()
        .await
        .map_err(repository_error(Resource::Book))?;
    Ok(web::Json(counts))
}

/// Up to fifty books still missing an Open Library cover id.
#[utoipa::path(
    get,
    path = "/api/admin/books-without-covers",
    responses(
        (status = 200, description = "Books lacking covers", body = [CoverCandidateSchema]),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "booksWithoutCovers",
    security(("SessionCookie" = []))
)]
#[get("/books-without-covers")]
pub async fn books_without_covers(
    _admin: AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CoverCandidate>>> {
    Ok(web::Json(state.enrichment.books_without_covers().await?))
}

/// Search Open Library for every book lacking a cover id.
#[utoipa::path(
    post,
    path = "/api/admin/backfill/covers",
    responses(
        (status = 200, description = "Backfill tally", body = BackfillReportSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "backfillCovers",
    security(("SessionCookie" = []))
)]
#[post("/backfill/covers")]
pub async fn backfill_covers(
    AdminUser(admin): AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<BackfillReport>> {
    let report = state.enrichment.backfill_cover_ids().await?;
    info!(admin = %admin.id, updated = report.updated, processed = report.processed, "cover backfill finished");
    Ok(web::Json(report))
}

/// Search Open Library for every author lacking a portrait.
#[utoipa::path(
    post,
    path = "/api/admin/backfill/author-images",
    responses(
        (status = 200, description = "Backfill tally", body = BackfillReportSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "backfillAuthorImages",
    security(("SessionCookie" = []))
)]
#[post("/backfill/author-images")]
pub async fn backfill_author_images(
    AdminUser(admin): AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<BackfillReport>> {
    let report = state.enrichment.backfill_author_images().await?;
    info!(admin = %admin.id, updated = report.updated, processed = report.processed, "author image backfill finished");
    Ok(web::Json(report))
}

/// Import search results that are not already catalogued.
#[utoipa::path(
    post,
    path = "/api/admin/import",
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Import tally", body = ImportReportSchema),
        (status = 400, description = "Query missing or limit out of range", body = ErrorSchema),
        (status = 503, description = "Open Library unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "importBooks",
    security(("SessionCookie" = []))
)]
#[post("/import")]
pub async fn import_books(
    AdminUser(admin): AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<ImportRequest>,
) -> ApiResult<HttpResponse> {
    let limit = payload.limit()?;
    let query = payload.query.as_deref().unwrap_or_default();
    let report = state.enrichment.import_from_search(query, limit).await?;
    info!(
        admin = %admin.id,
        imported = report.imported,
        duplicates = report.duplicates,
        "search import finished"
    );
    Ok(HttpResponse::Ok().json(report))
}

/// Routes mounted under `/api/admin`.
pub fn scope() -> actix_web::Scope {
    web::scope("/admin")
        .service(dashboard)
        .service(books_without_covers)
        .service(backfill_covers)
        .service(backfill_author_images)
        .service(import_books)
}
