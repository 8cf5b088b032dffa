//! Search and suggestion handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use dossier_core::{SearchRequest, Suggestion};

use crate::auth::AuthPrincipal;
use crate::error::ApiError;
use crate::handlers::Envelope;
use crate::AppState;

/// `POST /api/dms/search`
pub async fn search_post(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.engine.search(Some(&principal.user_id), &req).await?;
    Ok(Envelope::ok(response))
}

/// Query parameters for the simplified GET variant.
#[derive(Debug, Deserialize)]
pub struct SearchGetParams {
    pub q: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /api/dms/search?q=&limit=&offset=`
pub async fn search_get(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(params): Query<SearchGetParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut req = SearchRequest::new(params.q);
    req.limit = params.limit;
    req.offset = params.offset;

    let response = state.engine.search(Some(&principal.user_id), &req).await?;
    Ok(Envelope::ok(response))
}

/// Query parameters for suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub q: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsBody {
    pub suggestions: Vec<Suggestion>,
}

/// `GET /api/dms/suggestions?q=&limit=`
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<impl IntoResponse, ApiError> {
    let suggestions = state.engine.suggest(&params.q, params.limit).await?;
    Ok(Envelope::ok(SuggestionsBody { suggestions }))
}
