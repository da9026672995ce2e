//! # Article Harvest
//!
//! Collects results from a paginated, rate-limited article search API (the New York
//! Times Article Search API by default) and flattens them into a CSV dataset.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (QuerySpec, RawRecord, ResultRow, etc.)
//! - [`sources`]: The [`ArticleSearch`] seam and its HTTP and mock implementations
//! - [`harvest`]: The paginator, the projector and the end-to-end pipeline
//! - [`utils`]: HTTP client, rate gate, progress reporting and CSV output
//! - [`config`]: Layered configuration (defaults, file, environment, flags)

pub mod config;
pub mod harvest;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigError, HarvestConfig};
pub use harvest::{run, HarvestError, Paginator, ProjectionMode, Projector};
pub use models::{QuerySpec, RawRecord, ResultRow, ResultTable};
pub use sources::{ArticleSearch, SearchError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
