//! Liveness endpoints: GET /, GET /health

use axum::response::Json;
use serde::Serialize;

pub const SERVICE_NAME: &str = "Solv Crawler Service";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
}

/// GET / - Service banner
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} is running", SERVICE_NAME),
    })
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
