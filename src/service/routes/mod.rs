//! REST API routes
//!
//! ## Route Structure
//!
//! - `GET /` - Service banner
//! - `GET /health` - Health check endpoint
//! - `POST /crawl` - Run a crawl and return its page records

use crate::service::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod crawl;
pub mod health;

/// Create the API router with every endpoint registered
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/crawl", post(crawl::crawl))
}
