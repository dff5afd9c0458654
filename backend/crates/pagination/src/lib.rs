//! Page-number pagination primitives shared by Bookshelf list endpoints.
//!
//! The crate owns three concerns:
//!
//! - [`PageRequest`]: a validated `page`/`per_page` pair with SQL offset and
//!   limit helpers.
//! - [`PageInfo`] and [`Page`]: the `{ data, pagination }` JSON envelope
//!   returned by every list endpoint.
//! - [`PageLinks`]: `next`/`prev` URLs that keep the caller's other query
//!   parameters intact.

use serde::{Deserialize, Serialize};
use url::Url;

/// Page size used when the caller does not supply `per_page`.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Upper bound accepted for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

const PAGE_PARAM: &str = "page";
const PER_PAGE_PARAM: &str = "per_page";

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `page` was zero.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// `per_page` was zero or above [`MAX_PER_PAGE`].
    #[error("per_page must be between 1 and {max}")]
    PerPageOutOfRange {
        /// Largest accepted page size.
        max: u32,
    },
}

/// Validated one-based page selection.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 10).expect("valid page");
/// assert_eq!(request.offset(), 20);
/// assert_eq!(request.limit(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a request, rejecting a zero page or an out-of-range page size.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is out of range.
    pub const fn new(page: u32, per_page: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(PageRequestError::PerPageOutOfRange { max: MAX_PER_PAGE });
        }
        Ok(Self { page, per_page })
    }

    /// Build a request from optional query values, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when a supplied value is out of range.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Rows to skip, suitable for a SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Rows to return, suitable for a SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Page metadata serialised under the `pagination` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Current one-based page.
    pub page: u32,
    /// Requested page size.
    pub per_page: u32,
    /// Total matching items across all pages.
    pub total: u64,
    /// Number of pages; zero when nothing matched.
    pub pages: u64,
    /// Whether a previous page exists.
    pub has_prev: bool,
    /// Whether a following page exists.
    pub has_next: bool,
}

impl PageInfo {
    /// Derive page metadata from a request and the total match count.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageInfo, PageRequest};
    ///
    /// let info = PageInfo::new(PageRequest::new(2, 10).expect("valid"), 25);
    /// assert_eq!(info.pages, 3);
    /// assert!(info.has_prev && info.has_next);
    /// ```
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let pages = total.div_ceil(u64::from(request.per_page));
        let page = u64::from(request.page);
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            pages,
            has_prev: request.page > 1,
            has_next: page < pages,
        }
    }

    /// Build `next`/`prev` links relative to the URL that served this page.
    #[must_use]
    pub fn links(&self, current: &Url) -> PageLinks {
        let next = self
            .has_next
            .then(|| with_page(current, self.page.saturating_add(1), self.per_page));
        let prev = self
            .has_prev
            .then(|| with_page(current, self.page.saturating_sub(1), self.per_page));
        PageLinks { next, prev }
    }
}

/// JSON envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Page metadata.
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    /// Wrap a slice of results with metadata derived from `request`.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: PageInfo::new(request, total),
        }
    }

    /// Transform each item while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Navigation links for adjacent pages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLinks {
    /// Link to the following page, when one exists.
    pub next: Option<Url>,
    /// Link to the preceding page, when one exists.
    pub prev: Option<Url>,
}

impl PageLinks {
    /// Render the links as an RFC 8288 `Link` header value.
    ///
    /// Returns `None` when there are no adjacent pages.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        let parts: Vec<String> = [(&self.next, "next"), (&self.prev, "prev")]
            .into_iter()
            .filter_map(|(link, rel)| link.as_ref().map(|url| format!("<{url}>; rel=\"{rel}\"")))
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

fn with_page(current: &Url, page: u32, per_page: u32) -> Url {
    let retained: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM && key != PER_PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = current.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
        pairs.append_pair(PER_PAGE_PARAM, &per_page.to_string());
    }
    url
}
