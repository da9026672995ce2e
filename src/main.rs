use anyhow::{Context, Result};
use article_harvest::config::{
    find_config_file, HttpSettings, LogFormat, LoggingSettings, QuerySettings, RunSettings,
    Settings,
};
use article_harvest::models::SortMode;
use article_harvest::HarvestConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Article Harvest - Collect article search results into a CSV dataset
#[derive(Parser, Debug)]
#[command(name = "article-harvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collect article search results into a CSV dataset", long_about = None)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short)]
    quiet: bool,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatArg>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// API key for the search endpoint
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Search query
    #[arg(long, visible_alias = "query")]
    q: Option<String>,

    /// Comma-separated list of fields to return
    #[arg(long)]
    fl: Option<String>,

    /// Output CSV path
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Earliest publication date (YYYYMMDD)
    #[arg(long)]
    begin_date: Option<String>,

    /// Latest publication date (YYYYMMDD)
    #[arg(long)]
    end_date: Option<String>,

    /// Result ordering
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Filter query
    #[arg(long)]
    fq: Option<String>,

    /// Request facet counts
    #[arg(long)]
    facet: Option<bool>,

    /// Facet fields
    #[arg(long)]
    facet_fields: Option<String>,

    /// Facet filter
    #[arg(long)]
    facet_filter: Option<String>,

    /// Maximum number of records to collect
    #[arg(long = "max-num-results")]
    max_num_results: Option<usize>,

    /// Page to start from
    #[arg(long)]
    page: Option<u32>,

    /// Pages between progress reports (0 disables them)
    #[arg(long)]
    pages_per_update: Option<u32>,

    /// Records served per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Search endpoint URL
    #[arg(long)]
    url_base: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Minimum milliseconds between calls
    #[arg(long)]
    call_interval_ms: Option<u64>,

    /// Leave missing or mistyped fields empty instead of failing
    #[arg(long)]
    lenient: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortArg {
    Relevance,
    Newest,
    Oldest,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SortMode::Relevance,
            SortArg::Newest => SortMode::Newest,
            SortArg::Oldest => SortMode::Oldest,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Settings given on the command line; unset flags stay `None`
    fn overrides(&self) -> Settings {
        Settings {
            api_key: self.api_key.clone(),
            base_url: self.url_base.clone(),
            query: QuerySettings {
                q: self.q.clone(),
                fl: self.fl.clone(),
                begin_date: self.begin_date.clone(),
                end_date: self.end_date.clone(),
                sort: self.sort.map(SortMode::from),
                fq: self.fq.clone(),
                facet: self.facet,
                facet_fields: self.facet_fields.clone(),
                facet_filter: self.facet_filter.clone(),
                page: self.page,
            },
            run: RunSettings {
                dest: self.dest.clone(),
                max_results: self.max_num_results,
                pages_per_update: self.pages_per_update,
                page_size: self.page_size,
                lenient: self.lenient.then_some(true),
            },
            http: HttpSettings {
                timeout_secs: self.timeout,
                call_interval_ms: self.call_interval_ms,
            },
            logging: LoggingSettings {
                level: self.log_level().map(str::to_string),
                format: self.log_format.map(LogFormat::from),
            },
        }
    }

    fn log_level(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

fn init_tracing(logging: &LoggingSettings) {
    let level = logging.level.as_deref().unwrap_or("info");
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("article_harvest={}", level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.unwrap_or_default() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let settings = Settings::load(config_path.as_deref())
        .context("failed to load configuration")?
        .merge(cli.overrides());

    init_tracing(&settings.logging);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let config = HarvestConfig::from_settings(settings).context("invalid configuration")?;
    tracing::debug!(?config, "starting harvest");

    let summary = article_harvest::run(&config)
        .await
        .with_context(|| format!("harvest for {:?} failed", config.query.query()))?;

    tracing::info!(
        "saved {} rows to {}",
        summary.rows,
        summary.destination.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "article-harvest",
            "--api-key",
            "k",
            "--q",
            "election",
            "--fl",
            "snippet,headline",
            "--dest",
            "out.csv",
            "--sort",
            "newest",
            "--max-num-results",
            "40",
            "--lenient",
            "-v",
        ])
        .unwrap();

        let settings = cli.overrides();

        assert_eq!(settings.api_key.as_deref(), Some("k"));
        assert_eq!(settings.query.q.as_deref(), Some("election"));
        assert_eq!(settings.query.sort, Some(SortMode::Newest));
        assert_eq!(settings.run.max_results, Some(40));
        assert_eq!(settings.run.lenient, Some(true));
        assert_eq!(settings.logging.level.as_deref(), Some("debug"));
        assert_eq!(settings.query.begin_date, None);
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let cli = Cli::try_parse_from(["article-harvest", "--query", "x"]).unwrap();
        let settings = cli.overrides();

        assert_eq!(settings.query.q.as_deref(), Some("x"));
        assert_eq!(settings.run.lenient, None);
        assert_eq!(settings.logging.level, None);
    }

    #[test]
    fn test_quiet_wins() {
        let cli = Cli::try_parse_from(["article-harvest", "-q", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), Some("error"));
    }
}
