//! Utility modules supporting harvest runs.
//!
//! - [`HttpClient`]: HTTP client with timeouts and a crate user agent
//! - [`IntervalGate`]: one-call-per-interval rate gate behind the [`Pacer`] trait
//! - [`ProgressObserver`]: page-range progress notifications
//! - [`write_table`] / [`save_table`]: CSV output
//!
//! # Rate Gate
//!
//! ```rust,no_run
//! use article_harvest::utils::{IntervalGate, Pacer};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let gate = IntervalGate::new(Duration::from_millis(6100)).expect("non-zero interval");
//! gate.ready().await; // passes immediately
//! gate.ready().await; // waits 6.1 s
//! # }
//! ```

mod http;
mod progress;
mod rate_limit;
mod table_writer;

pub use http::HttpClient;
pub use progress::{completed_span, LogProgress, PageSpan, ProgressObserver, RecordingProgress};
pub use rate_limit::{IntervalGate, Pacer, RecordingSleeper, Sleeper, TokioSleeper};
pub use table_writer::{read_table, save_table, write_table, OutputError};
