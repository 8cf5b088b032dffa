//! HTTP-level integration tests driving the full router with oneshot.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use sqlx::Row;
use tower::ServiceExt;

use dossier_api::auth::{AuthConfig, Role};
use dossier_api::services::AnalyticsWriter;
use dossier_api::{build_router, AppState};
use dossier_core::AnalyticsBus;
use dossier_db::test_fixtures::{seeded_memory_db, MARKETING_DOC_ID};
use dossier_db::Database;
use dossier_search::SearchEngine;

const USER_TOKEN: &str = "user-token";
const ADMIN_TOKEN: &str = "admin-token";

async fn test_app() -> (axum::Router, Database) {
    let db = seeded_memory_db().await.expect("seeded db");

    let (bus, rx) = AnalyticsBus::channel();
    AnalyticsWriter::new(db.analytics.clone(), rx).spawn();

    let engine = SearchEngine::new(db.clone()).with_analytics(bus);
    let auth = AuthConfig::new()
        .with_token(USER_TOKEN, "dana", Role::User)
        .with_token(ADMIN_TOKEN, "root", Role::Admin);

    let state = AppState {
        db: db.clone(),
        engine,
        auth: Arc::new(auth),
    };
    (build_router(state), db)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_health_is_unauthenticated() {
    let (app, _db) = test_app().await;

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(get("/api/dms/search?q=marketing", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(get("/api/dms/search?q=marketing", Some("wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_get_search_marketing() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(get("/api/dms/search?q=marketing", Some(USER_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["results"][0]["id"], MARKETING_DOC_ID);
    let snippet = body["results"][0]["snippet"].as_str().unwrap().to_lowercase();
    assert!(snippet.contains("<mark>marketing</mark>"));
}

#[tokio::test]
async fn test_get_search_no_match() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(get("/api/dms/search?q=zzz_no_match", Some(USER_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_post_search_with_filters_and_pagination() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/dms/search",
            USER_TOKEN,
            serde_json::json!({
                "query": "marketing",
                "filters": {"file_extension": "pdf"},
                "limit": 1,
                "offset": 1,
                "sort_by": "relevance",
                "sort_order": "desc"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["has_next"], false);
    assert_eq!(body["pagination"]["has_prev"], true);
    assert_eq!(body["search"]["filters"]["file_extension"], "pdf");
    assert!(body["timing"]["total_ms"].as_u64().is_some());
}

#[tokio::test]
async fn test_post_search_validation_failure() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/dms/search",
            USER_TOKEN,
            serde_json::json!({"query": "marketing", "limit": 0, "offset": 9999}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"limit"));
    assert!(fields.contains(&"offset"));
}

// =============================================================================
// Rebuild
// =============================================================================

#[tokio::test]
async fn test_rebuild_requires_admin_and_leaves_index_unchanged() {
    let (app, db) = test_app().await;

    let stamp_before: String =
        sqlx::query("SELECT MAX(fts_last_updated) AS stamp FROM documents")
            .fetch_one(db.pool())
            .await
            .unwrap()
            .get("stamp");

    let response = app
        .oneshot(post_json(
            "/api/dms/rebuild-index",
            USER_TOKEN,
            serde_json::json!({"force": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    let stamp_after: String =
        sqlx::query("SELECT MAX(fts_last_updated) AS stamp FROM documents")
            .fetch_one(db.pool())
            .await
            .unwrap()
            .get("stamp");
    assert_eq!(stamp_before, stamp_after);
}

#[tokio::test]
async fn test_rebuild_as_admin() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/dms/rebuild-index",
            ADMIN_TOKEN,
            serde_json::json!({"force": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["document_count"], 4);
    assert_eq!(body["forced"], true);
}

#[tokio::test]
async fn test_rebuild_body_is_optional() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/dms/rebuild-index")
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["forced"], false);
}

// =============================================================================
// Suggestions, excerpts, stats, analytics
// =============================================================================

#[tokio::test]
async fn test_suggestions_endpoint() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(get("/api/dms/suggestions?q=mark", Some(USER_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["suggestions"][0]["suggestion"],
        "Marketing Strategy 2024"
    );
}

#[tokio::test]
async fn test_highlight_endpoint() {
    let (app, _db) = test_app().await;

    let uri = format!("/api/dms/highlight/{MARKETING_DOC_ID}?q=marketing");
    let response = app.oneshot(get(&uri, Some(USER_TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let excerpt = body["document"]["excerpt"].as_str().unwrap().to_lowercase();
    assert!(excerpt.contains("<mark>marketing</mark>"));
}

#[tokio::test]
async fn test_snippet_endpoint_not_found() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(get(
            "/api/dms/snippet/doc-does-not-exist?q=marketing",
            Some(USER_TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(get("/api/dms/stats", Some(USER_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["stats"]["total_documents"], 5);
    assert_eq!(body["stats"]["active_documents"], 4);
    assert_eq!(body["stats"]["indexed_documents"], 4);
}

#[tokio::test]
async fn test_analytics_endpoint() {
    let (app, db) = test_app().await;

    // Seed the log directly; the endpoint only aggregates.
    use dossier_core::AnalyticsStore;
    db.analytics
        .record(&dossier_core::SearchEvent {
            search_term: "marketing".into(),
            filters: serde_json::json!({"category": "marketing"}),
            user_id: Some("dana".into()),
            result_count: 2,
            search_time_ms: 9,
            occurred_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let response = app
        .oneshot(get("/api/dms/analytics", Some(USER_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["top_terms"][0]["term"], "marketing");
    assert_eq!(body["users"][0]["user_id"], "dana");
    assert_eq!(body["filter_usage"][0]["filter"], "category");
}
