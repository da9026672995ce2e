//! Article search endpoints.
//!
//! This module defines the [`ArticleSearch`] trait, the single seam between the
//! paginator and the network. [`NytArticleSearch`] talks to the real HTTP
//! endpoint; [`MockArticleSearch`] serves scripted pages for tests.

pub mod mock;
mod nyt;

pub use mock::{make_record, MockArticleSearch};
pub use nyt::{NytArticleSearch, NYT_ARTICLE_SEARCH_URL};

use crate::models::{QuerySpec, SearchPage};
use async_trait::async_trait;

/// An endpoint that serves one page of search results per call.
#[async_trait]
pub trait ArticleSearch: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this endpoint
    fn name(&self) -> &str;

    /// Fetch page `page` for `query`
    async fn fetch_page(&self, query: &QuerySpec, page: u32) -> Result<SearchPage, SearchError>;
}

/// Errors raised while fetching a page. Every variant names the page.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request could not be sent or the body could not be read
    #[error("request for page {page} failed: {message}")]
    Transport { page: u32, message: String },

    /// The request exceeded the configured timeout
    #[error("request for page {page} timed out")]
    Timeout { page: u32 },

    /// The endpoint answered with a non-success status
    #[error("request for page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },

    /// The body is not JSON of the expected `response.meta.hits` / `response.docs` shape
    #[error("malformed response for page {page}: {message}")]
    Schema { page: u32, message: String },
}

impl SearchError {
    /// Classify a reqwest failure for `page`
    pub fn from_reqwest(page: u32, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout { page }
        } else {
            SearchError::Transport {
                page,
                message: err.to_string(),
            }
        }
    }

    pub fn from_json(page: u32, err: serde_json::Error) -> Self {
        SearchError::Schema {
            page,
            message: format!("JSON: {}", err),
        }
    }

    /// Page being fetched when the error occurred
    pub fn page(&self) -> u32 {
        match self {
            SearchError::Transport { page, .. }
            | SearchError::Timeout { page }
            | SearchError::Status { page, .. }
            | SearchError::Schema { page, .. } => *page,
        }
    }

    /// Whether the failure happened in the response body rather than on the wire
    pub fn is_schema(&self) -> bool {
        matches!(self, SearchError::Schema { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_and_kind() {
        let err = SearchError::Status {
            page: 7,
            status: 429,
        };
        assert_eq!(err.page(), 7);
        assert!(!err.is_schema());
        assert_eq!(err.to_string(), "request for page 7 returned HTTP 429");

        let err = SearchError::from_json(2, serde_json::from_str::<u8>("{").unwrap_err());
        assert_eq!(err.page(), 2);
        assert!(err.is_schema());
    }
}
