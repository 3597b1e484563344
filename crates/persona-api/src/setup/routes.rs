//! Route configuration and setup

use crate::auth::{admin_auth_middleware, AdminAuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use persona_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

const API_PREFIX: &str = "/api";

/// Headroom for text fields and multipart framing on top of the file payloads.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let admin_state = Arc::new(AdminAuthState::new(config.base.admin_api_key.clone()));

    let admin_routes = admin_routes().layer(axum::middleware::from_fn_with_state(
        admin_state,
        admin_auth_middleware,
    ));

    let route_prefix = config.local_storage.route_prefix.trim_end_matches('/');
    if route_prefix.is_empty() {
        return Err(anyhow::anyhow!(
            "LOCAL_STORAGE_ROUTE must not be the root path"
        ));
    }
    let static_files = ServeDir::new(&config.local_storage.base_path);

    // A create request carries up to two images.
    let body_limit = config.images.max_upload_bytes * 2 + FORM_OVERHEAD_BYTES;

    let app = public_routes()
        .merge(admin_routes)
        .nest_service(route_prefix, static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness_check))
        .route(
            &format!("{}/characters", API_PREFIX),
            get(handlers::characters::list_characters).post(handlers::characters::create_character),
        )
        .route(
            &format!("{}/characters/{{id}}", API_PREFIX),
            get(handlers::characters::get_character)
                .put(handlers::characters::update_character)
                .delete(handlers::characters::delete_character),
        )
        .route(&format!("{}/chat", API_PREFIX), post(handlers::chat::chat))
        .route(
            &format!("{}/media/videos", API_PREFIX),
            get(handlers::media::list_videos),
        )
        .route(
            &format!("{}/media/carousel", API_PREFIX),
            get(handlers::media::list_carousel),
        )
}

/// Admin routes (require the admin key)
fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/admin/stats", API_PREFIX),
            get(handlers::admin::stats),
        )
        .route(
            &format!("{}/admin/characters", API_PREFIX),
            get(handlers::admin::list_all_characters),
        )
        .route(
            &format!("{}/admin/characters/{{id}}/restore", API_PREFIX),
            post(handlers::admin::restore_character),
        )
        .route(
            &format!("{}/admin/characters/{{id}}", API_PREFIX),
            delete(handlers::admin::hard_delete_character),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.base.cors_origins.iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .base
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
