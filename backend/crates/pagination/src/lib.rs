//! Page-number pagination primitives for list endpoints.
//!
//! Requests are expressed as a one-based `page` plus a `limit`. Responses use
//! the `{count, next, previous, results}` envelope, where `next` and
//! `previous` are absolute links that preserve the caller's other query
//! parameters.

use serde::{Deserialize, Serialize};
use url::Url;

/// Page size used when the caller does not provide `limit`.
pub const DEFAULT_LIMIT: u32 = 6;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// Query parameter carrying the one-based page number.
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

/// Errors raised while parsing pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The page number was not a positive integer.
    #[error("page must be a positive integer, got '{value}'")]
    InvalidPage {
        /// Raw value supplied by the caller.
        value: String,
    },
    /// The page size was not a positive integer.
    #[error("limit must be a positive integer, got '{value}'")]
    InvalidLimit {
        /// Raw value supplied by the caller.
        value: String,
    },
    /// The page size exceeded [`MAX_LIMIT`].
    #[error("limit must not exceed {max}")]
    LimitTooLarge {
        /// Maximum accepted page size.
        max: u32,
    },
}

/// Validated pagination request.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::from_params(Some("3"), Some("10")).expect("valid params");
/// assert_eq!(request.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request from already-parsed numbers.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when `page` or `limit` is zero or `limit`
    /// exceeds [`MAX_LIMIT`].
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage {
                value: page.to_string(),
            });
        }
        if limit == 0 {
            return Err(PaginationError::InvalidLimit {
                value: limit.to_string(),
            });
        }
        if limit > MAX_LIMIT {
            return Err(PaginationError::LimitTooLarge { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// Parse raw query-string values, applying defaults for missing ones.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when a value is not a positive integer or
    /// the limit is too large.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        let page = match page {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| PaginationError::InvalidPage {
                    value: raw.to_owned(),
                })?,
            None => 1,
        };
        let limit = match limit {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| PaginationError::InvalidLimit {
                    value: raw.to_owned(),
                })?,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items to skip before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of items together with the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Wrap the items for `request` with the overall match count.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Build a page by slicing an in-memory collection.
    #[must_use]
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, total, request)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Total number of matches across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Request that produced this page.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Whether a later page holds more items.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.request.offset() + (self.items.len() as u64) < self.total
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.request.page > 1
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Transform every item while keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

/// Serialised pagination envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of matches across all pages.
    pub count: u64,
    /// Absolute link to the next page, if any.
    pub next: Option<String>,
    /// Absolute link to the previous page, if any.
    pub previous: Option<String>,
    /// Items on the current page.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build the envelope, deriving navigation links from `base`.
    ///
    /// `base` is the URL of the current request; every query parameter other
    /// than `page` and `limit` is preserved in the generated links.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest, Paginated};
    /// use url::Url;
    ///
    /// let request = PageRequest::new(1, 2).expect("valid request");
    /// let page = Page::new(vec!["a", "b"], 3, request);
    /// let base = Url::parse("http://localhost/api/v1/recipes?tags=vegan").expect("url");
    /// let envelope = Paginated::from_page(page, &base);
    /// assert_eq!(
    ///     envelope.next.as_deref(),
    ///     Some("http://localhost/api/v1/recipes?tags=vegan&page=2&limit=2")
    /// );
    /// assert!(envelope.previous.is_none());
    /// ```
    #[must_use]
    pub fn from_page(page: Page<T>, base: &Url) -> Self {
        let request = page.request();
        let next = page
            .has_next()
            .then(|| page_link(base, request.page() + 1, request.limit()));
        let previous = page
            .has_previous()
            .then(|| page_link(base, request.page() - 1, request.limit()));
        Self {
            count: page.total(),
            next,
            previous,
            results: page.into_items(),
        }
    }
}

fn page_link(base: &Url, page: u32, limit: u32) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM && key != LIMIT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
        pairs.append_pair(LIMIT_PARAM, &limit.to_string());
    }
    url.into()
}
