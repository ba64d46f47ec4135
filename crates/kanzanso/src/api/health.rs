//! Liveness and connectivity checks.

use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
struct Status {
    status: &'static str,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

impl Status {
    fn new(status: &'static str, message: &'static str) -> Json<Self> {
        Json(Self {
            status,
            message,
            timestamp: Utc::now(),
        })
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/test", get(test))
        .route("/test/cors", get(test_cors))
}

async fn health() -> Json<Status> {
    Status::new("UP", "Application is running")
}

async fn test() -> Json<Status> {
    Status::new("success", "Backend connection successful")
}

async fn test_cors() -> Json<Status> {
    Status::new("success", "CORS is configured correctly")
}
