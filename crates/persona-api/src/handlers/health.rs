//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, T, E>(f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(CHECK_TIMEOUT, f).await {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
    pub storage_backend: String,
    pub chat: String,
}

/// Liveness check - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Database failures make the service unhealthy; storage problems only degrade it
/// since uploads fall back to local disk.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => run_check(sqlx::query("SELECT 1").execute(pool), "unhealthy").await,
        None => "in-memory".to_string(),
    };
    let overall_healthy = database == "healthy" || database == "in-memory";
    if !overall_healthy {
        tracing::error!(database = %database, "Database health check failed");
    }

    let primary = state.storage.primary();
    let storage = run_check(primary.list(""), "degraded").await;
    if storage != "healthy" {
        tracing::warn!(storage = %storage, "Storage health check warning");
    }

    let response = HealthCheckResponse {
        status: if overall_healthy { "healthy" } else { "unhealthy" }.to_string(),
        database,
        storage,
        storage_backend: primary.backend_type().to_string(),
        chat: if state.chat.is_configured() {
            "configured"
        } else {
            "disabled"
        }
        .to_string(),
    };

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
