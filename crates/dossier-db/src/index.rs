//! FTS index builder.
//!
//! Recomputes the `fts_content`/`fts_tokens`/`fts_metadata` projection of
//! each document row, then asks the FTS5 virtual table to rebuild itself
//! from the refreshed base table. A non-forced rebuild refreshes only stale
//! rows (`fts_last_updated` missing or older than `updated_at`); `force`
//! refreshes everything.
//!
//! The whole pass runs inside one transaction: any SQL error aborts the
//! rebuild with no partial state. An in-process mutex serializes rebuilds;
//! a second caller fails fast with a conflict instead of queueing a
//! redundant full pass.

use std::sync::Arc;
use std::time::Instant;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;
use tracing::{info, warn};

use dossier_core::{Error, IndexRebuildReport, Result};

/// Word characters (letters, digits, underscore) across scripts.
const TOKEN_PATTERN: &str = r"[\p{L}\p{N}_]+";

/// Builder maintaining the documents FTS projection and virtual table.
#[derive(Debug, Clone)]
pub struct FtsIndexBuilder {
    pool: SqlitePool,
    rebuild_lock: Arc<Mutex<()>>,
    token_re: Regex,
}

struct RowProjection {
    fts_content: String,
    fts_tokens: String,
    fts_metadata: Option<String>,
}

impl FtsIndexBuilder {
    /// Create a new index builder over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            rebuild_lock: Arc::new(Mutex::new(())),
            token_re: Regex::new(TOKEN_PATTERN).expect("token pattern is valid"),
        }
    }

    /// Rebuild the FTS projection and index.
    ///
    /// Returns the number of documents present in the index afterwards, so
    /// back-to-back rebuilds with no intervening document changes report the
    /// same count.
    pub async fn rebuild(&self, force: bool) -> Result<IndexRebuildReport> {
        let _guard = self
            .rebuild_lock
            .try_lock()
            .map_err(|_| Error::Conflict("index rebuild already in progress".to_string()))?;

        let start = Instant::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let mut select_sql = String::from(
            "SELECT id, title, description, content, tags, metadata, status, \
             category, document_type FROM documents",
        );
        if !force {
            select_sql.push_str(
                " WHERE fts_last_updated IS NULL \
                 OR (updated_at IS NOT NULL AND fts_last_updated < updated_at)",
            );
        }

        let rows = sqlx::query(&select_sql)
            .fetch_all(&mut *tx)
            .await
            .map_err(Error::Database)?;
        let refreshed = rows.len();

        let now = chrono::Utc::now();
        for row in &rows {
            let id: String = row.get("id");
            let status: String = row.get("status");

            if status == "active" {
                let projection = self.project(row);
                sqlx::query(
                    "UPDATE documents SET fts_content = ?, fts_tokens = ?, \
                     fts_metadata = ?, fts_last_updated = ? WHERE id = ?",
                )
                .bind(&projection.fts_content)
                .bind(&projection.fts_tokens)
                .bind(&projection.fts_metadata)
                .bind(now)
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            } else {
                // Ineligible rows must not appear in search results.
                sqlx::query(
                    "UPDATE documents SET fts_content = NULL, fts_tokens = NULL, \
                     fts_metadata = NULL, fts_last_updated = ? WHERE id = ?",
                )
                .bind(now)
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            }
        }

        // Repopulate the external-content index from the refreshed base table.
        sqlx::query("INSERT INTO documents_fts(documents_fts) VALUES('rebuild')")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let count_row =
            sqlx::query("SELECT COUNT(*) AS indexed FROM documents WHERE fts_content IS NOT NULL")
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        let document_count: i64 = count_row.get("indexed");

        tx.commit().await.map_err(Error::Database)?;

        let report = IndexRebuildReport {
            document_count,
            rebuild_time_ms: start.elapsed().as_millis() as u64,
            forced: force,
        };

        info!(
            subsystem = "db",
            component = "index_builder",
            op = "rebuild",
            document_count = report.document_count,
            refreshed,
            duration_ms = report.rebuild_time_ms,
            forced = force,
            "Index rebuild complete"
        );

        Ok(report)
    }

    /// Whether any row's FTS projection is missing or out of date.
    pub async fn is_stale(&self) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE fts_last_updated IS NULL \
             OR (updated_at IS NOT NULL AND fts_last_updated < updated_at)) AS stale",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.get::<i64, _>("stale") != 0)
    }

    /// Lazily refresh the index if anything is stale.
    ///
    /// Returns the rebuild report when a rebuild ran, `None` when the index
    /// was already fresh.
    pub async fn ensure_fresh(&self) -> Result<Option<IndexRebuildReport>> {
        if self.is_stale().await? {
            Ok(Some(self.rebuild(false).await?))
        } else {
            Ok(None)
        }
    }

    fn project(&self, row: &sqlx::sqlite::SqliteRow) -> RowProjection {
        let id: String = row.get("id");
        let title: String = row.get("title");
        let description: Option<String> = row.get("description");
        let content: Option<String> = row.get("content");
        let tags: Option<String> = row.get("tags");
        let metadata_raw: Option<String> = row.get("metadata");
        let status: String = row.get("status");
        let category: Option<String> = row.get("category");
        let document_type: Option<String> = row.get("document_type");

        let metadata_fields = selected_metadata(&id, metadata_raw.as_deref());
        let metadata_text = metadata_fields
            .as_ref()
            .map(|fields| {
                fields
                    .values()
                    .filter_map(JsonValue::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let fts_content = compose_fts_content(&[
            Some(title.as_str()),
            description.as_deref(),
            content.as_deref(),
            tags.as_deref().map(str::trim).filter(|t| !t.is_empty()),
            (!metadata_text.is_empty()).then_some(metadata_text.as_str()),
            Some(status.as_str()),
            category.as_deref(),
            document_type.as_deref(),
        ]);

        let fts_tokens = self.tokenize(&fts_content);
        let fts_metadata = metadata_fields
            .map(|fields| JsonValue::Object(fields).to_string());

        RowProjection {
            fts_content,
            fts_tokens,
            fts_metadata,
        }
    }

    /// Lowercased, deduplicated word tokens in first-seen order.
    fn tokenize(&self, text: &str) -> String {
        let mut seen = std::collections::HashSet::new();
        let mut tokens = Vec::new();
        for m in self.token_re.find_iter(text) {
            let token = m.as_str().to_lowercase();
            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        }
        tokens.join(" ")
    }
}

/// Join the present parts with newlines; commas in tag lists become spaces.
fn compose_fts_content(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|part| part.replace(',', " "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Top-level string fields of the stored metadata blob.
///
/// Malformed JSON nulls the projection for the row rather than failing the
/// rebuild.
fn selected_metadata(id: &str, raw: Option<&str>) -> Option<Map<String, JsonValue>> {
    let raw = raw?;
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Object(object)) => {
            let fields: Map<String, JsonValue> = object
                .into_iter()
                .filter(|(_, value)| value.is_string())
                .collect();
            (!fields.is_empty()).then_some(fields)
        }
        Ok(_) => None,
        Err(e) => {
            warn!(
                subsystem = "db",
                component = "index_builder",
                document_id = %id,
                error = %e,
                "Stored metadata is not valid JSON; skipping for indexing"
            );
            None
        }
    }
}
