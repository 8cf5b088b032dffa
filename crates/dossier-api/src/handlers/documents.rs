//! Single-document highlight/snippet and corpus stats handlers.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dossier_core::{CorpusStats, DocumentExcerpt, DocumentStore};

use crate::error::ApiError;
use crate::handlers::Envelope;
use crate::AppState;

/// Query parameters shared by the highlight and snippet routes.
#[derive(Debug, Deserialize)]
pub struct ExcerptParams {
    pub q: String,
    pub open_tag: Option<String>,
    pub close_tag: Option<String>,
    pub snippet_length: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DocumentBody {
    pub document: DocumentExcerpt,
}

/// `GET /api/dms/highlight/:id?q=&open_tag=&close_tag=`
pub async fn highlight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ExcerptParams>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .engine
        .highlight(
            &id,
            &params.q,
            params.open_tag.as_deref(),
            params.close_tag.as_deref(),
        )
        .await?;
    Ok(Envelope::ok(DocumentBody { document }))
}

/// `GET /api/dms/snippet/:id?q=&snippet_length=&open_tag=&close_tag=`
pub async fn snippet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ExcerptParams>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .engine
        .snippet(
            &id,
            &params.q,
            params.snippet_length,
            params.open_tag.as_deref(),
            params.close_tag.as_deref(),
        )
        .await?;
    Ok(Envelope::ok(DocumentBody { document }))
}

/// Query parameters for corpus stats.
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct StatsBody {
    pub stats: CorpusStats,
}

/// `GET /api/dms/stats?date_from=&date_to=`
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .db
        .documents
        .corpus_stats(params.date_from, params.date_to)
        .await?;
    Ok(Envelope::ok(StatsBody { stats }))
}
