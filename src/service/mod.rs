//! HTTP service exposing the crawler
//!
//! The service is a thin adapter: it owns the process settings and the
//! fetch backend, turns requests into crawl configurations, and renders
//! reports and errors as JSON.

pub mod error;
pub mod routes;

pub use error::AppError;
pub use routes::crawl::{CrawlRequest, CrawlResponse};

use crate::config::Settings;
use crate::crawler::{PageFetcher, SessionCredential};
use crate::{ConfigError, CrawlError};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub session: Option<SessionCredential>,
    /// Cancelled on shutdown; running crawls return partial results
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(settings: Settings, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            settings: Arc::new(settings),
            fetcher,
            session: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Builds the state, loading the session credential named in the settings
    pub fn from_settings(
        settings: Settings,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, ConfigError> {
        let session = match settings.crawler.storage_state.trim() {
            "" => None,
            path => {
                let credential = SessionCredential::from_file(Path::new(path))?;
                tracing::info!("Loaded session state from {}", path);
                Some(credential)
            }
        };

        Ok(Self {
            session,
            ..Self::new(settings, fetcher)
        })
    }
}

/// Create the axum application with middleware
pub fn router(state: AppState) -> Router {
    routes::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address and serves until `state.shutdown` fires
pub async fn serve(state: AppState) -> Result<(), CrawlError> {
    let addr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Solv Crawler Service listening on {}", listener.local_addr()?);

    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
