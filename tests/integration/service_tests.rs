//! Integration tests for the HTTP service
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` and an
//! in-memory fetch backend.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use solv_crawler::config::Settings;
use solv_crawler::crawler::{FetchOutcome, FetchRequest, FetchedDocument, PageFetcher};
use solv_crawler::service::{router, AppState};
use solv_crawler::FetchError;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

const SEED: &str = "https://solv.example/";

/// Serves a fixed set of pages from memory
struct StaticSite {
    pages: HashMap<String, String>,
}

impl StaticSite {
    fn new() -> Self {
        let mut pages = HashMap::new();
        pages.insert(
            SEED.to_string(),
            r#"<html><head><title>Solv</title><meta name="description" content="Staking"></head>
               <body><a href="/staking">Staking</a><a href="/news">News</a>
               <a href="https://twitter.com/solv">Twitter</a></body></html>"#
                .to_string(),
        );
        pages.insert(
            "https://solv.example/staking".to_string(),
            "<html><head><title>Staking</title></head><body></body></html>".to_string(),
        );
        pages.insert(
            "https://solv.example/news".to_string(),
            "<html><head><title>News</title></head><body></body></html>".to_string(),
        );
        Self { pages }
    }
}

#[async_trait]
impl PageFetcher for StaticSite {
    async fn fetch(&self, request: FetchRequest<'_>) -> FetchOutcome {
        match self.pages.get(request.url.as_str()) {
            Some(html) => FetchOutcome::Success(FetchedDocument {
                final_url: request.url.clone(),
                status_code: 200,
                content_type: "text/html".to_string(),
                html: html.clone(),
            }),
            None => FetchOutcome::Failure(FetchError::HttpStatus(404)),
        }
    }
}

fn test_state() -> AppState {
    let mut settings = Settings::default();
    settings.crawler.default_delay = 0.0;
    settings.crawler.settle_time = 0.0;
    AppState::new(settings, Arc::new(StaticSite::new()))
}

fn test_app() -> Router {
    router(test_state())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(Method::GET)
        .body(Body::empty())
        .unwrap()
}

fn post_crawl(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/crawl")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_banner() {
    let (status, body) = send(test_app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Solv Crawler Service is running"}));
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(test_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "service": "Solv Crawler Service"})
    );
}

#[tokio::test]
async fn test_crawl_seed_only_by_default_depth() {
    let (status, body) = send(
        test_app(),
        post_crawl(json!({"url": SEED, "max_depth": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["message"], "Successfully crawled 1 pages");

    let page = &body["data"][0];
    assert_eq!(page["url"], SEED);
    assert_eq!(page["depth"], 0);
    assert_eq!(page["metadata"]["title"], "Solv");
    assert_eq!(page["metadata"]["description"], "Staking");
    assert_eq!(page["links"]["external"], json!(["https://twitter.com/solv"]));
    assert_eq!(
        page["links"]["internal"],
        json!(["https://solv.example/staking", "https://solv.example/news"])
    );
}

#[tokio::test]
async fn test_crawl_follows_internal_links() {
    let (status, body) = send(test_app(), post_crawl(json!({"url": SEED}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["stats"]["status"], "completed");
    assert_eq!(body["stats"]["fetched"], 3);
}

#[tokio::test]
async fn test_crawl_respects_max_pages_and_keywords() {
    let (status, body) = send(
        test_app(),
        post_crawl(json!({
            "url": SEED,
            "max_depth": 1,
            "delay": 0.0,
            "headless": false,
            "keywords": ["news"],
            "max_pages": 2
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pages"], 2);
    // The keyword-matching page is fetched right after the seed
    assert_eq!(body["data"][1]["url"], "https://solv.example/news");
}

#[tokio::test]
async fn test_crawl_rejects_unparseable_url() {
    let (status, body) = send(test_app(), post_crawl(json!({"url": "not a url"}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request"));
}

#[tokio::test]
async fn test_crawl_requires_url() {
    let (status, body) = send(test_app(), post_crawl(json!({"max_depth": 1}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Invalid request"));
    assert!(detail.contains("url"));
}

#[tokio::test]
async fn test_crawl_rejects_malformed_json() {
    let request = Request::builder()
        .uri("/crawl")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(test_app(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request"));
}

#[tokio::test]
async fn test_crawl_rejects_missing_content_type() {
    let request = Request::builder()
        .uri("/crawl")
        .method(Method::POST)
        .body(Body::from(json!({"url": SEED}).to_string()))
        .unwrap();

    let (status, body) = send(test_app(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_crawl_invalid_config_is_server_error() {
    let (status, body) = send(
        test_app(),
        post_crawl(json!({"url": "ftp://solv.example/file"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Crawling failed: "));
}

#[tokio::test]
async fn test_crawl_negative_delay_is_server_error() {
    let (status, body) = send(
        test_app(),
        post_crawl(json!({"url": SEED, "delay": -1.0})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("mean_delay"));
}

#[tokio::test]
async fn test_crawl_during_shutdown_returns_partial_results() {
    let state = test_state();
    state.shutdown.cancel();

    let (status, body) = send(router(state), post_crawl(json!({"url": SEED}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pages"], 0);
    assert_eq!(body["stats"]["status"], "cancelled");
    assert_eq!(body["message"], "Crawl cancelled after 0 pages");
}

#[tokio::test]
async fn test_unreachable_seed_returns_empty_success() {
    let (status, body) = send(
        test_app(),
        post_crawl(json!({"url": "https://solv.example/missing"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pages"], 0);
    assert_eq!(body["stats"]["skipped"], 1);
}
