//! The harvest pipeline: collect pages, project records, write the table.
//!
//! [`run`] wires the real HTTP endpoint and wall-clock rate gate from a
//! [`HarvestConfig`]; [`run_with`] takes a ready-made [`Paginator`] so the same
//! pipeline can be driven by a mock endpoint and a fake clock.
//!
//! Nothing is written unless collection and projection both succeed.

mod paginator;
mod projector;

pub use paginator::{Paginator, DEFAULT_PAGE_SIZE};
pub use projector::{ProjectionMode, Projector, SchemaError};

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{ConfigError, HarvestConfig};
use crate::sources::{NytArticleSearch, SearchError};
use crate::utils::{save_table, HttpClient, IntervalGate, OutputError};

/// Broad category of a harvest failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing configuration, raised before any network activity
    Config,
    /// The outbound call failed, timed out or was refused
    Transport,
    /// A response or record did not have the expected shape
    Schema,
    /// The table could not be written
    Output,
}

/// Errors that end a harvest run
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("projection failed: {0}")]
    Projection(#[from] SchemaError),

    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
}

impl HarvestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarvestError::Config(_) => ErrorKind::Config,
            HarvestError::HttpClient(_) => ErrorKind::Transport,
            HarvestError::Search(err) if err.is_schema() => ErrorKind::Schema,
            HarvestError::Search(_) => ErrorKind::Transport,
            HarvestError::Projection(_) => ErrorKind::Schema,
            HarvestError::Output { .. } => ErrorKind::Output,
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows written
    pub rows: usize,

    /// File the rows were written to
    pub destination: PathBuf,
}

/// Run a harvest against the configured endpoint
pub async fn run(config: &HarvestConfig) -> Result<RunSummary, HarvestError> {
    let client = HttpClient::new(config.request_timeout).map_err(HarvestError::HttpClient)?;
    let search = NytArticleSearch::new(client, config.base_url.clone(), config.api_key.clone());
    let gate = IntervalGate::new(config.call_interval).ok_or(ConfigError::Invalid {
        name: "call_interval_ms",
        reason: "must be greater than zero".to_string(),
    })?;

    let paginator = Paginator::new(Arc::new(search), Arc::new(gate)).page_size(config.page_size);

    run_with(&paginator, config).await
}

/// Run a harvest with an already assembled paginator
pub async fn run_with(
    paginator: &Paginator,
    config: &HarvestConfig,
) -> Result<RunSummary, HarvestError> {
    let records = paginator
        .collect(&config.query, config.max_results, config.progress_interval)
        .await?;

    let table = Projector::new(config.projection).project(&records)?;

    save_table(&table, &config.destination).map_err(|source| HarvestError::Output {
        path: config.destination.clone(),
        source,
    })?;

    info!(
        rows = table.len(),
        destination = %config.destination.display(),
        "wrote results"
    );

    Ok(RunSummary {
        rows: table.len(),
        destination: config.destination.clone(),
    })
}
