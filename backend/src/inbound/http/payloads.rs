//! Request and response shapes shared by the resource handlers.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::text::normalize;

/// `?page=&per_page=&search=` accepted by every list endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// One-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Page size between 1 and 100; defaults to 20.
    pub per_page: Option<u32>,
    /// Case-insensitive substring filter.
    pub search: Option<String>,
}

impl ListQuery {
    /// Validated page selection.
    pub fn page_request(&self) -> Result<PageRequest, Error> {
        Ok(PageRequest::from_query(self.page, self.per_page)?)
    }

    /// Normalised search term, absent when blank.
    pub fn search(&self) -> Option<String> {
        self.search.as_deref().and_then(normalize)
    }
}

/// `200` response for a page, with a `Link` header for adjacent pages.
pub fn page_response<T: Serialize>(req: &HttpRequest, page: &Page<T>) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    if let Some(links) = page.pagination.links(&req.full_url()).header_value() {
        response.insert_header((header::LINK, links));
    }
    response.json(page)
}

/// `{message}` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    /// Human-readable outcome.
    #[schema(example = "Book deleted")]
    pub message: String,
}

impl MessageBody {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("  Lord   of THE "), Some("lord of the"))]
    #[case(Some("   "), None)]
    #[case(None, None)]
    fn search_terms_are_normalised(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let query = ListQuery {
            search: raw.map(str::to_owned),
            ..ListQuery::default()
        };
        assert_eq!(query.search().as_deref(), expected);
    }

    #[rstest]
    fn page_defaults_apply() {
        let request = ListQuery::default().page_request().expect("defaults");
        assert_eq!((request.page(), request.per_page()), (1, 20));
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(None, Some(101))]
    fn out_of_range_pages_are_invalid(#[case] page: Option<u32>, #[case] per_page: Option<u32>) {
        let query = ListQuery {
            page,
            per_page,
            search: None,
        };
        let err = query.page_request().expect_err("out of range");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
