//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the HTTP backend.

use solv_crawler::config::{BrowserType, CrawlConfig};
use solv_crawler::crawler::{
    run_crawl, FetchOutcome, FetchRequest, HttpFetcher, PageFetcher, SessionCredential,
};
use solv_crawler::output::{sort_records, CrawlStatus};
use solv_crawler::FetchError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_fetcher(timeout: Duration) -> Arc<dyn PageFetcher> {
    Arc::new(HttpFetcher::new(BrowserType::Chromium, timeout).expect("Failed to build fetcher"))
}

/// Creates a fast test configuration seeded at the mock server root
fn create_test_config(base_url: &str, max_depth: u32) -> CrawlConfig {
    CrawlConfig::new(format!("{}/", base_url))
        .with_max_depth(max_depth)
        .with_delay(0.0, 0.0)
        .with_settle_time(0.0)
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(title, body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        r#"<a href="/page1">Page 1</a>
           <a href="/page2">Page 2</a>
           <a href="https://example.org/elsewhere">Elsewhere</a>"#,
    )
    .await;
    mount_page(&mock_server, "/page1", "Page 1", r#"<a href="/page3">Deeper</a>"#).await;
    mount_page(&mock_server, "/page2", "Page 2", r#"<a href="/">Home</a>"#).await;

    // Beyond max depth, must never be requested
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(html_page("Page 3", ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 1);
    let mut report = run_crawl(config, http_fetcher(Duration::from_secs(5)))
        .await
        .expect("Crawl failed");
    sort_records(&mut report.records);

    assert_eq!(report.stats.status, CrawlStatus::Completed);
    assert_eq!(report.records.len(), 3);

    let home = &report.records[0];
    assert_eq!(home.url, format!("{}/", base_url));
    assert_eq!(home.depth, 0);
    assert_eq!(home.title(), Some("Home"));
    assert_eq!(
        home.links.internal,
        vec![format!("{}/page1", base_url), format!("{}/page2", base_url)]
    );
    assert_eq!(home.links.external, vec!["https://example.org/elsewhere"]);

    assert_eq!(report.records[1].url, format!("{}/page1", base_url));
    assert_eq!(report.records[1].depth, 1);
    assert_eq!(report.records[1].links.internal, vec![format!("{}/page3", base_url)]);
    assert_eq!(report.records[2].url, format!("{}/page2", base_url));
}

#[tokio::test]
async fn test_dead_link_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        r#"<a href="/ok">OK</a><a href="/missing">Missing</a>"#,
    )
    .await;
    mount_page(&mock_server, "/ok", "OK", "").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let report = run_crawl(
        create_test_config(&base_url, 1),
        http_fetcher(Duration::from_secs(5)),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.stats.skipped, 1);
    assert!(!report.records.iter().any(|r| r.url.ends_with("/missing")));
}

#[tokio::test]
async fn test_non_html_response_is_dropped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", r#"<a href="/report">Report</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let report = run_crawl(
        create_test_config(&base_url, 1),
        http_fetcher(Duration::from_secs(5)),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.stats.filtered, 1);
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", r#"<a href="/old">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", "New Home", "").await;

    let mut report = run_crawl(
        create_test_config(&base_url, 1),
        http_fetcher(Duration::from_secs(5)),
    )
    .await
    .expect("Crawl failed");
    sort_records(&mut report.records);

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[1].url, format!("{}/old", base_url));
    assert_eq!(report.records[1].title(), Some("New Home"));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", r#"<a href="/slow">Slow</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("Slow", "").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let report = run_crawl(
        create_test_config(&base_url, 1),
        http_fetcher(Duration::from_millis(300)),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.stats.skipped, 1);
}

#[tokio::test]
async fn test_session_cookies_are_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "sid=abc123"))
        .respond_with(html_page("Members", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credential = SessionCredential::from_json(
        r#"{"cookies": [{"name": "sid", "value": "abc123", "domain": "127.0.0.1", "path": "/"}]}"#,
    )
    .expect("Invalid credential");

    let config = create_test_config(&base_url, 0).with_session_credential(Some(credential));
    let report = run_crawl(config, http_fetcher(Duration::from_secs(5)))
        .await
        .expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title(), Some("Members"));
}

#[tokio::test]
async fn test_http_fetcher_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/here", "Here", "").await;

    let fetcher = http_fetcher(Duration::from_secs(5));

    let gone = Url::parse(&format!("{}/gone", mock_server.uri())).unwrap();
    let outcome = fetcher
        .fetch(FetchRequest {
            url: &gone,
            headless: true,
            session: None,
        })
        .await;
    assert_eq!(outcome, FetchOutcome::Failure(FetchError::HttpStatus(410)));

    let here = Url::parse(&format!("{}/here", mock_server.uri())).unwrap();
    match fetcher
        .fetch(FetchRequest {
            url: &here,
            headless: false,
            session: None,
        })
        .await
    {
        FetchOutcome::Success(document) => {
            assert_eq!(document.status_code, 200);
            assert_eq!(document.final_url, here);
            assert!(document.content_type.starts_with("text/html"));
            assert!(document.html.contains("<title>Here</title>"));
        }
        FetchOutcome::Failure(e) => panic!("Unexpected failure: {}", e),
    }
}
