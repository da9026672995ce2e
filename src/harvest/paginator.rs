//! Page-by-page collection of search results.

use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{QuerySpec, RawRecord, SearchPage};
use crate::sources::{ArticleSearch, SearchError};
use crate::utils::{completed_span, LogProgress, Pacer, ProgressObserver};

/// Records per page served by the Article Search API
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Drives an [`ArticleSearch`] until enough records are collected.
///
/// Calls are strictly sequential and every call first passes the [`Pacer`].
pub struct Paginator {
    search: Arc<dyn ArticleSearch>,
    pacer: Arc<dyn Pacer>,
    progress: Arc<dyn ProgressObserver>,
    page_size: usize,
}

impl Paginator {
    pub fn new(search: Arc<dyn ArticleSearch>, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            search,
            pacer,
            progress: Arc::new(LogProgress),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Records the endpoint serves per page
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Where progress notifications go (default: the log)
    pub fn progress_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = observer;
        self
    }

    /// Collect up to `max_results` records for `query`, in retrieval order.
    ///
    /// The first response fixes the target at `min(max_results, hits)`. Pages
    /// are then fetched until the target is reached or the endpoint returns an
    /// empty page. A `max_results` of zero makes no call at all.
    pub async fn collect(
        &self,
        query: &QuerySpec,
        max_results: usize,
        progress_interval: Option<NonZeroU32>,
    ) -> Result<Vec<RawRecord>, SearchError> {
        if max_results == 0 {
            debug!("max_results is zero, skipping search");
            return Ok(Vec::new());
        }

        let start = query.start_page();
        let mut page = start;
        let mut current = self.fetch(query, page).await?;

        let hits = current.hits;
        let target = usize::try_from(hits).map_or(max_results, |h| h.min(max_results));
        info!(
            hits,
            target,
            "there were {} hits for the query, retrieving {}",
            hits,
            target
        );

        let mut records = Vec::with_capacity(target.min(1024));
        while records.len() < target {
            if current.is_empty() {
                warn!(
                    page,
                    collected = records.len(),
                    target,
                    "endpoint returned an empty page before the target was reached"
                );
                break;
            }

            let taken = self.take(current, target, &mut records);
            debug!(page, taken, collected = records.len(), target, "page collected");

            if page != start {
                if let Some(span) = completed_span(page, progress_interval) {
                    self.progress.pages_completed(span);
                }
            }

            if records.len() >= target {
                break;
            }

            let Some(next) = page.checked_add(1) else {
                warn!(
                    page,
                    collected = records.len(),
                    target,
                    "no page number left after the last page, stopping"
                );
                break;
            };
            page = next;
            current = self.fetch(query, page).await?;
        }

        Ok(records)
    }

    async fn fetch(&self, query: &QuerySpec, page: u32) -> Result<SearchPage, SearchError> {
        self.pacer.ready().await;
        debug!(page, source = self.search.name(), "fetching page");
        self.search.fetch_page(query, page).await
    }

    /// Append the slice of `page` still needed to reach `target`
    fn take(&self, page: SearchPage, target: usize, records: &mut Vec<RawRecord>) -> usize {
        let wanted = self.page_size.min(target.saturating_sub(records.len()));
        let before = records.len();
        records.extend(page.docs.into_iter().take(wanted));
        records.len() - before
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("search", &self.search)
            .field("page_size", &self.page_size)
            .finish()
    }
}
