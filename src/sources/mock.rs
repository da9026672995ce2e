//! Mock endpoint for testing purposes.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::models::{QuerySpec, RawRecord, SearchPage};
use crate::sources::{ArticleSearch, SearchError};

/// A mock endpoint that serves a synthetic result set of `hits` records.
///
/// Page `p` holds records `p * page_size ..` like the real endpoint, so a
/// non-zero start page skips records. Individual pages can be replaced or made
/// to fail, and every requested page number is recorded.
#[derive(Debug)]
pub struct MockArticleSearch {
    hits: u64,
    page_size: usize,
    overrides: Mutex<HashMap<u32, SearchPage>>,
    failures: Mutex<HashMap<u32, String>>,
    calls: Mutex<Vec<u32>>,
}

impl MockArticleSearch {
    /// Create a mock reporting `hits` total hits with pages of 10
    pub fn new(hits: u64) -> Self {
        Self::with_page_size(hits, 10)
    }

    pub fn with_page_size(hits: u64, page_size: usize) -> Self {
        Self {
            hits,
            page_size,
            overrides: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serve `response` for `page` instead of the synthetic page
    pub fn set_page(&self, page: u32, response: SearchPage) {
        lock(&self.overrides).insert(page, response);
    }

    /// Fail requests for `page` with a transport error
    pub fn fail_page(&self, page: u32, message: impl Into<String>) {
        lock(&self.failures).insert(page, message.into());
    }

    /// Page numbers requested so far, in call order
    pub fn calls(&self) -> Vec<u32> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn synthetic_page(&self, page: u32) -> SearchPage {
        let start = (page as u64).saturating_mul(self.page_size as u64);
        let end = start.saturating_add(self.page_size as u64).min(self.hits);
        let docs = (start..end).map(make_record).collect();
        SearchPage::new(self.hits, docs)
    }
}

#[async_trait]
impl ArticleSearch for MockArticleSearch {
    fn name(&self) -> &str {
        "Mock Article Search"
    }

    async fn fetch_page(&self, _query: &QuerySpec, page: u32) -> Result<SearchPage, SearchError> {
        lock(&self.calls).push(page);

        if let Some(message) = lock(&self.failures).get(&page) {
            return Err(SearchError::Transport {
                page,
                message: message.clone(),
            });
        }

        match lock(&self.overrides).get(&page) {
            Some(response) => Ok(response.clone()),
            None => Ok(self.synthetic_page(page)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Helper function to create a complete article record for testing.
pub fn make_record(n: u64) -> RawRecord {
    let value = json!({
        "snippet": format!("Snippet {}", n),
        "headline": {
            "main": format!("Headline {}", n),
            "print_headline": format!("Print headline {}", n),
            "sub": null,
        },
        "pub_date": format!("2021-03-{:02}T05:00:00+0000", n % 28 + 1),
        "source": "The New York Times",
        "type_of_material": "News",
        "word_count": 100 + n,
    });
    RawRecord::from_value(value).unwrap_or_default()
}
