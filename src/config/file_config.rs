//! Layered settings: configuration file and environment.
//!
//! # Configuration File Format
//!
//! ```toml
//! api_key = "your-api-key"
//! base_url = "https://api.nytimes.com/svc/search/v2/articlesearch.json"
//!
//! [query]
//! q = "climate change"
//! fl = "snippet,headline,pub_date,source,type_of_material,word_count"
//! begin_date = "20170301"
//! end_date = "20220201"
//! sort = "newest"
//! fq = "section_name:(\"Science\")"
//! facet = false
//! page = 0
//!
//! [run]
//! dest = "results.csv"
//! max_results = 200
//! pages_per_update = 5
//! page_size = 10
//! lenient = false
//!
//! [http]
//! timeout_secs = 30
//! call_interval_ms = 6100
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```
//!
//! Every key can also be set from the environment with the `ARTICLE_HARVEST_`
//! prefix and `__` between sections, e.g. `ARTICLE_HARVEST_QUERY__Q`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::ConfigError;
use crate::models::SortMode;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ARTICLE_HARVEST";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "article-harvest.toml";

/// Every setting, all optional. Defaults are applied when building a
/// [`HarvestConfig`](super::HarvestConfig).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub query: QuerySettings,

    #[serde(default)]
    pub run: RunSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Search parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default)]
    pub q: Option<String>,

    /// Comma-separated field list
    #[serde(default)]
    pub fl: Option<String>,

    #[serde(default)]
    pub begin_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    pub sort: Option<SortMode>,

    #[serde(default)]
    pub fq: Option<String>,

    #[serde(default)]
    pub facet: Option<bool>,

    #[serde(default)]
    pub facet_fields: Option<String>,

    #[serde(default)]
    pub facet_filter: Option<String>,

    #[serde(default)]
    pub page: Option<u32>,
}

/// Run size and output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(default)]
    pub dest: Option<PathBuf>,

    #[serde(default)]
    pub max_results: Option<usize>,

    /// Pages between progress reports, 0 disables them
    #[serde(default)]
    pub pages_per_update: Option<u32>,

    #[serde(default)]
    pub page_size: Option<usize>,

    #[serde(default)]
    pub lenient: Option<bool>,
}

/// HTTP behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Minimum spacing between calls
    #[serde(default)]
    pub call_interval_ms: Option<u64>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: Option<String>,

    #[serde(default)]
    pub format: Option<LogFormat>,
}

impl Settings {
    /// Load settings from an optional TOML file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Overlay `overrides` on top of `self`; set values in `overrides` win
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            api_key: overrides.api_key.or(self.api_key),
            base_url: overrides.base_url.or(self.base_url),
            query: QuerySettings {
                q: overrides.query.q.or(self.query.q),
                fl: overrides.query.fl.or(self.query.fl),
                begin_date: overrides.query.begin_date.or(self.query.begin_date),
                end_date: overrides.query.end_date.or(self.query.end_date),
                sort: overrides.query.sort.or(self.query.sort),
                fq: overrides.query.fq.or(self.query.fq),
                facet: overrides.query.facet.or(self.query.facet),
                facet_fields: overrides.query.facet_fields.or(self.query.facet_fields),
                facet_filter: overrides.query.facet_filter.or(self.query.facet_filter),
                page: overrides.query.page.or(self.query.page),
            },
            run: RunSettings {
                dest: overrides.run.dest.or(self.run.dest),
                max_results: overrides.run.max_results.or(self.run.max_results),
                pages_per_update: overrides.run.pages_per_update.or(self.run.pages_per_update),
                page_size: overrides.run.page_size.or(self.run.page_size),
                lenient: overrides.run.lenient.or(self.run.lenient),
            },
            http: HttpSettings {
                timeout_secs: overrides.http.timeout_secs.or(self.http.timeout_secs),
                call_interval_ms: overrides.http.call_interval_ms.or(self.http.call_interval_ms),
            },
            logging: LoggingSettings {
                level: overrides.logging.level.or(self.logging.level),
                format: overrides.logging.format.or(self.logging.format),
            },
        }
    }
}

/// Find a config file: `./article-harvest.toml`, then
/// `<config dir>/article-harvest/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("article-harvest").join("config.toml"))
        .filter(|path| path.is_file())
}
