//! # dossier-api
//!
//! HTTP API server for the dossier search service.
//!
//! The router and application state live in the library so integration
//! tests can drive the full stack with `tower::ServiceExt::oneshot`; the
//! binary in `main.rs` only wires configuration and serves.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use dossier_db::Database;
use dossier_search::SearchEngine;

use crate::auth::AuthConfig;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging production incidents.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: SearchEngine,
    pub auth: Arc<AuthConfig>,
}

/// Parse allowed CORS origins from a comma-separated environment variable.
///
/// `ALLOWED_ORIGINS` unset or empty allows only localhost development
/// origins; a wildcard is never installed.
pub fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var("ALLOWED_ORIGINS").unwrap_or_default();

    if origins_str.trim().is_empty() {
        return vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_allowed_origins()))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(
            dossier_core::defaults::CORS_MAX_AGE_SECS,
        ));

    let api = Router::new()
        .route(
            "/api/dms/search",
            post(handlers::search::search_post).get(handlers::search::search_get),
        )
        .route("/api/dms/suggestions", get(handlers::search::suggestions))
        .route("/api/dms/analytics", get(handlers::analytics::analytics))
        .route("/api/dms/rebuild-index", post(handlers::admin::rebuild_index))
        .route("/api/dms/highlight/:id", get(handlers::documents::highlight))
        .route("/api/dms/snippet/:id", get(handlers::documents::snippet))
        .route("/api/dms/stats", get(handlers::documents::stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(
            dossier_core::defaults::MAX_BODY_SIZE_BYTES,
        ))
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state)
}
