//! Tests for index building: delta refresh, force, idempotence, eligibility.

use sqlx::Row;

use crate::test_fixtures::{memory_db, seed_sample_documents, seeded_memory_db, ARCHIVED_DOC_ID};
use dossier_core::Error;

#[tokio::test]
async fn test_rebuild_is_idempotent() {
    let db = seeded_memory_db().await.expect("seeded db");

    let first = db.index.rebuild(false).await.unwrap();
    let second = db.index.rebuild(false).await.unwrap();

    assert_eq!(first.document_count, second.document_count);
    assert_eq!(first.document_count, 4);
}

#[tokio::test]
async fn test_forced_rebuild_reports_same_count() {
    let db = seeded_memory_db().await.expect("seeded db");

    let forced = db.index.rebuild(true).await.unwrap();
    assert!(forced.forced);
    assert_eq!(forced.document_count, 4);
}

#[tokio::test]
async fn test_inactive_rows_are_not_indexed() {
    let db = seeded_memory_db().await.expect("seeded db");

    let row = sqlx::query("SELECT fts_content, fts_tokens FROM documents WHERE id = ?")
        .bind(ARCHIVED_DOC_ID)
        .fetch_one(db.pool())
        .await
        .unwrap();

    assert!(row.get::<Option<String>, _>("fts_content").is_none());
    assert!(row.get::<Option<String>, _>("fts_tokens").is_none());
}

#[tokio::test]
async fn test_fts_content_concatenates_fields() {
    let db = seeded_memory_db().await.expect("seeded db");

    let row = sqlx::query("SELECT fts_content, fts_metadata FROM documents WHERE id = ?")
        .bind(crate::test_fixtures::MARKETING_DOC_ID)
        .fetch_one(db.pool())
        .await
        .unwrap();

    let content: String = row.get("fts_content");
    assert!(content.contains("Marketing Strategy 2024"));
    assert!(content.contains("brand positioning"));
    // Tag commas become spaces.
    assert!(content.contains("marketing strategy 2024"));
    // Status/category/type are searchable.
    assert!(content.contains("active"));
    assert!(content.contains("marketing"));

    // Selected metadata (string fields) is projected as JSON.
    let metadata: String = row.get("fts_metadata");
    let value: serde_json::Value = serde_json::from_str(&metadata).unwrap();
    assert_eq!(value["client"], "Internal");
}

#[tokio::test]
async fn test_delta_rebuild_skips_fresh_rows() {
    let db = seeded_memory_db().await.expect("seeded db");

    let before: String =
        sqlx::query("SELECT fts_last_updated FROM documents WHERE id = ?")
            .bind(crate::test_fixtures::MARKETING_DOC_ID)
            .fetch_one(db.pool())
            .await
            .unwrap()
            .get("fts_last_updated");

    // Nothing changed, so a non-forced rebuild must not touch the row.
    db.index.rebuild(false).await.unwrap();

    let after: String = sqlx::query("SELECT fts_last_updated FROM documents WHERE id = ?")
        .bind(crate::test_fixtures::MARKETING_DOC_ID)
        .fetch_one(db.pool())
        .await
        .unwrap()
        .get("fts_last_updated");

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_updated_row_is_reindexed_without_force() {
    let db = seeded_memory_db().await.expect("seeded db");

    sqlx::query("UPDATE documents SET content = ?, updated_at = ? WHERE id = ?")
        .bind("Revised plan mentioning hovercraft logistics.")
        .bind(chrono::Utc::now())
        .bind(crate::test_fixtures::MARKETING_DOC_ID)
        .execute(db.pool())
        .await
        .unwrap();

    assert!(db.index.is_stale().await.unwrap());
    db.index.rebuild(false).await.unwrap();
    assert!(!db.index.is_stale().await.unwrap());

    let (rows, total) = db
        .search
        .execute(&super::fts_query("\"hovercraft\""))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, crate::test_fixtures::MARKETING_DOC_ID);
}

#[tokio::test]
async fn test_ensure_fresh_noop_when_fresh() {
    let db = seeded_memory_db().await.expect("seeded db");

    assert!(db.index.ensure_fresh().await.unwrap().is_none());
}

#[tokio::test]
async fn test_ensure_fresh_rebuilds_unindexed_corpus() {
    let db = memory_db().await.expect("fresh db");
    // Seeding rebuilds; wipe the projection to simulate rows written by an
    // external flow that never indexed them.
    seed_sample_documents(&db).await.unwrap();
    sqlx::query("UPDATE documents SET fts_last_updated = NULL")
        .execute(db.pool())
        .await
        .unwrap();

    let report = db.index.ensure_fresh().await.unwrap().expect("rebuild ran");
    assert_eq!(report.document_count, 4);
}

#[tokio::test]
async fn test_concurrent_rebuild_conflicts_fail_fast() {
    let db = seeded_memory_db().await.expect("seeded db");

    let (first, second) = tokio::join!(db.index.rebuild(true), db.index.rebuild(true));

    // At least one must win; a loser fails fast with Conflict instead of
    // queueing a redundant pass.
    assert!(first.is_ok() || second.is_ok());
    for outcome in [first, second] {
        if let Err(e) = outcome {
            assert!(matches!(e, Error::Conflict(_)), "unexpected error: {e}");
        }
    }
}
