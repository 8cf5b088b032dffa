//! Search analytics reporting handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::Envelope;
use crate::AppState;

/// Query parameters for the analytics report.
#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Top-terms leaderboard size.
    pub limit: Option<i64>,
}

/// `GET /api/dms/analytics?date_from=&date_to=&limit=`
pub async fn analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .engine
        .analytics_report(params.date_from, params.date_to, params.limit)
        .await?;
    Ok(Envelope::ok(report))
}
