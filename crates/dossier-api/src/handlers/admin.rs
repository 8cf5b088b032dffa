//! Admin handlers: index rebuild.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthPrincipal;
use crate::error::ApiError;
use crate::handlers::Envelope;
use crate::AppState;

/// Body of the rebuild request. The body itself is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RebuildRequest {
    #[serde(default)]
    pub force: bool,
}

/// `POST /api/dms/rebuild-index` — admin only.
pub async fn rebuild_index(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    body: Option<Json<RebuildRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.role.is_admin() {
        return Err(ApiError::Forbidden("admin role required".to_string()));
    }

    let force = body.map(|Json(body)| body.force).unwrap_or(false);
    let report = state.db.index.rebuild(force).await?;

    info!(
        subsystem = "api",
        op = "rebuild_index",
        user_id = %principal.user_id,
        document_count = report.document_count,
        duration_ms = report.rebuild_time_ms,
        forced = force,
        "Index rebuild requested"
    );

    Ok(Envelope::ok(report))
}
