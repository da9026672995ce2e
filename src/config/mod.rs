//! Configuration management.
//!
//! Settings are gathered from defaults, an optional TOML file, the environment
//! and command-line flags (see [`Settings`]), then validated once into an
//! immutable [`HarvestConfig`] that is passed by reference to the pipeline.

mod file_config;

pub use file_config::{
    find_config_file, HttpSettings, LogFormat, LoggingSettings, QuerySettings, RunSettings,
    Settings, ENV_PREFIX, LOCAL_CONFIG_FILE,
};

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::harvest::{ProjectionMode, DEFAULT_PAGE_SIZE};
use crate::models::{FacetOptions, QuerySpec};
use crate::sources::NYT_ARTICLE_SEARCH_URL;

pub const DEFAULT_BEGIN_DATE: &str = "20170301";
pub const DEFAULT_END_DATE: &str = "20220201";
pub const DEFAULT_MAX_RESULTS: usize = 20;
pub const DEFAULT_PAGES_PER_UPDATE: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The endpoint allows 10 calls a minute; 6.1 s keeps a margin.
pub const DEFAULT_CALL_INTERVAL_MS: u64 = 6100;

/// Errors raised while assembling the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required parameter `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Validated configuration for one harvest run
#[derive(Clone)]
pub struct HarvestConfig {
    /// Credential sent as the `api-key` parameter
    pub api_key: String,

    /// Search endpoint
    pub base_url: Url,

    pub query: QuerySpec,

    /// Output CSV path
    pub destination: PathBuf,

    /// Upper bound on collected records
    pub max_results: usize,

    /// Pages between progress reports, `None` for no reports
    pub progress_interval: Option<NonZeroU32>,

    /// Records per page served by the endpoint
    pub page_size: usize,

    pub projection: ProjectionMode,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Minimum spacing between calls
    pub call_interval: Duration,
}

impl HarvestConfig {
    /// Apply defaults to `settings` and validate the result
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let api_key = settings
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("api_key"))?;

        let q = settings.query.q.ok_or(ConfigError::Missing("q"))?;
        let fl = settings.query.fl.ok_or(ConfigError::Missing("fl"))?;
        let destination = settings
            .run
            .dest
            .filter(|dest| !dest.as_os_str().is_empty())
            .ok_or(ConfigError::Missing("dest"))?;

        let mut builder = QuerySpec::builder(q, fl.split(','))
            .begin_date(
                settings
                    .query
                    .begin_date
                    .unwrap_or_else(|| DEFAULT_BEGIN_DATE.to_string()),
            )
            .end_date(
                settings
                    .query
                    .end_date
                    .unwrap_or_else(|| DEFAULT_END_DATE.to_string()),
            )
            .sort(settings.query.sort.unwrap_or_default())
            .facet(FacetOptions {
                enabled: settings.query.facet.unwrap_or(false),
                fields: settings.query.facet_fields,
                filter: settings.query.facet_filter,
            })
            .start_page(settings.query.page.unwrap_or(0));
        if let Some(fq) = settings.query.fq {
            builder = builder.filter_query(fq);
        }
        let query = builder.build()?;

        let raw_url = settings
            .base_url
            .unwrap_or_else(|| NYT_ARTICLE_SEARCH_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: "url_base",
            reason: format!("{}: {:?}", e, raw_url),
        })?;

        let page_size = settings.run.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "page_size",
                reason: "must be greater than zero".to_string(),
            });
        }

        let timeout_secs = settings.http.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        let call_interval_ms = settings
            .http
            .call_interval_ms
            .unwrap_or(DEFAULT_CALL_INTERVAL_MS);
        if call_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "call_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        let projection = if settings.run.lenient.unwrap_or(false) {
            ProjectionMode::Lenient
        } else {
            ProjectionMode::Strict
        };

        Ok(Self {
            api_key,
            base_url,
            query,
            destination,
            max_results: settings.run.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            progress_interval: NonZeroU32::new(
                settings
                    .run
                    .pages_per_update
                    .unwrap_or(DEFAULT_PAGES_PER_UPDATE),
            ),
            page_size,
            projection,
            request_timeout: Duration::from_secs(timeout_secs),
            call_interval: Duration::from_millis(call_interval_ms),
        })
    }
}

impl std::fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("query", &self.query)
            .field("destination", &self.destination)
            .field("max_results", &self.max_results)
            .field("progress_interval", &self.progress_interval)
            .field("page_size", &self.page_size)
            .field("projection", &self.projection)
            .field("request_timeout", &self.request_timeout)
            .field("call_interval", &self.call_interval)
            .finish()
    }
}
