//! HTTP handlers for dossier-api.

pub mod admin;
pub mod analytics;
pub mod documents;
pub mod search;

use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

/// Success envelope: `{"success": true, ...body}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a response body in the success envelope.
    pub fn ok(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}

/// Liveness probe. Unauthenticated.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
