use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use persona_core::constants::ADMIN_KEY_HEADER;
use persona_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AdminAuthState {
    pub admin_api_key: String,
}

impl AdminAuthState {
    pub fn new(admin_api_key: impl Into<String>) -> Self {
        Self {
            admin_api_key: admin_api_key.into(),
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// `X-Admin-Key: <key>` wins over `Authorization: Bearer <key>`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get(ADMIN_KEY_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(key.trim());
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

pub async fn admin_auth_middleware(
    State(auth_state): State<Arc<AdminAuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = presented_key(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Admin request without credentials");
        return HttpAppError(AppError::Unauthorized(
            "Missing admin API key".to_string(),
        ))
        .into_response();
    };

    if !secure_compare(key, &auth_state.admin_api_key) {
        tracing::warn!(path = %request.uri().path(), "Admin request with invalid key");
        return HttpAppError(AppError::Unauthorized("Invalid admin API key".to_string()))
            .into_response();
    }

    next.run(request).await
}
