//! Integration tests for article-harvest
//!
//! These tests run the whole pipeline against a local mock HTTP server and a
//! temporary output directory.

use article_harvest::config::Settings;
use article_harvest::harvest::{run_with, ErrorKind};
use article_harvest::sources::{make_record, MockArticleSearch};
use article_harvest::utils::{read_table, IntervalGate};
use article_harvest::{HarvestConfig, Paginator, ProjectionMode};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const SEARCH_PATH: &str = "/svc/search/v2/articlesearch.json";

fn page_body(hits: u64, range: std::ops::Range<u64>) -> String {
    let docs: Vec<Value> = range
        .map(|n| serde_json::to_value(make_record(n)).unwrap())
        .collect();
    json!({
        "status": "OK",
        "response": {
            "meta": { "hits": hits, "offset": 0, "time": 12 },
            "docs": docs
        }
    })
    .to_string()
}

fn config_for(server: &ServerGuard, dest: &Path, max_results: usize) -> HarvestConfig {
    let mut settings = Settings::default();
    settings.api_key = Some("test-key".to_string());
    settings.base_url = Some(format!("{}{}", server.url(), SEARCH_PATH));
    settings.query.q = Some("election".to_string());
    settings.query.fl = Some("snippet,headline,pub_date,source,type_of_material,word_count".to_string());
    settings.run.dest = Some(dest.to_path_buf());
    settings.run.max_results = Some(max_results);
    settings.http.call_interval_ms = Some(1);
    settings.http.timeout_secs = Some(5);
    HarvestConfig::from_settings(settings).unwrap()
}

#[test]
fn test_environment_layer_and_precedence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("article-harvest.toml");
    std::fs::write(
        &path,
        r#"
api_key = "file-key"

[query]
q = "file q"
fl = "snippet,headline"

[run]
dest = "file.csv"
max_results = 3
"#,
    )
    .unwrap();

    std::env::set_var("ARTICLE_HARVEST_API_KEY", "env-key");
    std::env::set_var("ARTICLE_HARVEST_RUN__MAX_RESULTS", "7");
    std::env::set_var("ARTICLE_HARVEST_QUERY__Q", "env q");
    let loaded = Settings::load(Some(&path));
    std::env::remove_var("ARTICLE_HARVEST_API_KEY");
    std::env::remove_var("ARTICLE_HARVEST_RUN__MAX_RESULTS");
    std::env::remove_var("ARTICLE_HARVEST_QUERY__Q");
    let settings = loaded.unwrap();

    // Environment beats the file; keys only in the file survive
    assert_eq!(settings.api_key.as_deref(), Some("env-key"));
    assert_eq!(settings.run.max_results, Some(7));
    assert_eq!(settings.query.q.as_deref(), Some("env q"));
    assert_eq!(settings.query.fl.as_deref(), Some("snippet,headline"));
    assert_eq!(settings.run.dest, Some(PathBuf::from("file.csv")));

    // Flags beat both
    let mut flags = Settings::default();
    flags.query.q = Some("flag q".to_string());
    flags.run.lenient = Some(true);
    let merged = settings.merge(flags);

    assert_eq!(merged.query.q.as_deref(), Some("flag q"));
    assert_eq!(merged.api_key.as_deref(), Some("env-key"));

    let config = HarvestConfig::from_settings(merged).unwrap();
    assert_eq!(config.query.query(), "flag q");
    assert_eq!(config.max_results, 7);
    assert_eq!(config.projection, ProjectionMode::Lenient);
}

#[tokio::test]
async fn test_end_to_end_two_pages() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "0".into()),
            Matcher::UrlEncoded("api-key".into(), "test-key".into()),
            Matcher::UrlEncoded("q".into(), "election".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_body(15, 0..10))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_body(15, 10..15))
        .expect(1)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("results.csv");
    let config = config_for(&server, &dest, 15);

    let summary = article_harvest::run(&config).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(summary.rows, 15);
    assert_eq!(summary.destination, dest);

    let table = read_table(File::open(&dest).unwrap()).unwrap();
    assert_eq!(table.len(), 15);
    let first_row = &table.rows()[0];
    assert_eq!(first_row.main_headline, "Headline 0");
    assert_eq!(first_row.pub_date, "2021-03-01");
    assert_eq!(first_row.sub_headline, "");
    assert_eq!(first_row.word_count, Some(100));
    assert_eq!(table.rows()[14].snippet, "Snippet 14");
}

#[tokio::test]
async fn test_no_hits_writes_header_only() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page_body(0, 0..0))
        .expect(1)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("empty.csv");
    let config = config_for(&server, &dest, 20);

    let summary = article_harvest::run(&config).await.unwrap();

    mock.assert_async().await;
    assert_eq!(summary.rows, 0);
    let contents = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(
        contents,
        "snippet,main_headline,pub_date,source,print_headline,sub_headline,type_of_material,word_count\n"
    );
}

#[tokio::test]
async fn test_missing_field_writes_nothing() {
    let mut server = Server::new_async().await;
    let mut doc = serde_json::to_value(make_record(0)).unwrap();
    doc.as_object_mut().unwrap().remove("word_count");
    let body = json!({
        "response": { "meta": { "hits": 1 }, "docs": [doc] }
    })
    .to_string();
    server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("results.csv");
    let config = config_for(&server, &dest, 20);

    let err = article_harvest::run(&config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(err.to_string().contains("word_count"));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_server_error_writes_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "0".into()))
        .with_status(200)
        .with_body(page_body(30, 0..10))
        .create_async()
        .await;
    server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(500)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("results.csv");
    let config = config_for(&server, &dest, 30);

    let err = article_harvest::run(&config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("page 1"));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_invalid_body_is_schema_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("results.csv");
    let config = config_for(&server, &dest, 10);

    let err = article_harvest::run(&config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_run_with_mock_search_and_fake_clock() {
    let search = Arc::new(MockArticleSearch::new(42));
    let (gate, sleeper) = IntervalGate::fake(Duration::from_millis(6100)).unwrap();
    let paginator = Paginator::new(search.clone(), Arc::new(gate));

    let dir = tempdir().unwrap();
    let dest = dir.path().join("mock.csv");
    let mut settings = Settings::default();
    settings.api_key = Some("unused".to_string());
    settings.query.q = Some("election".to_string());
    settings.query.fl = Some("snippet".to_string());
    settings.run.dest = Some(dest.clone());
    settings.run.max_results = Some(35);
    let config = HarvestConfig::from_settings(settings).unwrap();

    let summary = run_with(&paginator, &config).await.unwrap();

    assert_eq!(summary.rows, 35);
    assert_eq!(search.calls(), vec![0, 1, 2, 3]);
    assert_eq!(sleeper.total(), Duration::from_millis(6100 * 3));
    let table = read_table(File::open(&dest).unwrap()).unwrap();
    assert_eq!(table.rows()[34].snippet, "Snippet 34");
}
