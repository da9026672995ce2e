//! Progress reporting for long harvests.
//!
//! With the endpoint allowing ten calls a minute, a run of a few thousand
//! results takes the better part of an hour. The paginator reports every
//! `interval` pages so the operator can see it is still moving.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};

/// Range of pages covered by one progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub first: u32,
    pub last: u32,
}

impl std::fmt::Display for PageSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.first, self.last)
    }
}

/// The span to report after finishing `page`, if any.
///
/// A span is reported when `page` is an exact multiple of the interval and
/// covers `page - interval ..= page`.
pub fn completed_span(page: u32, interval: Option<NonZeroU32>) -> Option<PageSpan> {
    let interval = interval?.get();
    (page % interval == 0).then(|| PageSpan {
        first: page.saturating_sub(interval),
        last: page,
    })
}

/// Receives progress notifications from the paginator
pub trait ProgressObserver: Send + Sync {
    fn pages_completed(&self, span: PageSpan);
}

/// Reports progress as `info` log events
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn pages_completed(&self, span: PageSpan) {
        tracing::info!(first = span.first, last = span.last, "retrieved pages {}", span);
    }
}

/// Keeps every notification, for tests
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    spans: Arc<Mutex<Vec<PageSpan>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> Vec<PageSpan> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressObserver for RecordingProgress {
    fn pages_completed(&self, span: PageSpan) {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(span);
    }
}
