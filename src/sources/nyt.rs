//! New York Times Article Search endpoint.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use crate::models::{QuerySpec, RawRecord, SearchPage};
use crate::sources::{ArticleSearch, SearchError};
use crate::utils::HttpClient;

pub const NYT_ARTICLE_SEARCH_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";

/// Article Search API source
///
/// Sends one `GET` per page with the credential as the `api-key` parameter.
#[derive(Clone)]
pub struct NytArticleSearch {
    client: HttpClient,
    base_url: Url,
    api_key: String,
}

impl NytArticleSearch {
    pub fn new(client: HttpClient, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Full parameter list for one request, credential first
    fn request_params(&self, query: &QuerySpec, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("api-key", self.api_key.clone())];
        params.extend(query.query_params(page));
        params
    }
}

impl std::fmt::Debug for NytArticleSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NytArticleSearch")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ArticleSearch for NytArticleSearch {
    fn name(&self) -> &str {
        "NYT Article Search"
    }

    async fn fetch_page(&self, query: &QuerySpec, page: u32) -> Result<SearchPage, SearchError> {
        let response = self
            .client
            .client()
            .get(self.base_url.clone())
            .header(ACCEPT, "application/json")
            .query(&self.request_params(query, page))
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest(page, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::from_reqwest(page, e))?;

        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|e| SearchError::from_json(page, e))?;

        Ok(SearchPage::new(
            envelope.response.meta.hits,
            envelope.response.docs,
        ))
    }
}

// ===== Article Search API Types =====

#[derive(Debug, Deserialize)]
struct Envelope {
    response: ResponseBody,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    meta: Meta,
    docs: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    hits: u64,
}
