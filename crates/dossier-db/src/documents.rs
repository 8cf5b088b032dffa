//! Document repository: read access and corpus-wide stats.
//!
//! Document writes belong to the upload/proposal flows outside this service;
//! the search subsystem only reads rows and maintains their FTS projection
//! (see [`crate::index`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use dossier_core::{BucketCount, CorpusStats, Document, DocumentStore, Error, Result};

use crate::split_tags;

/// Document repository over a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteDocumentRepository {
    pool: SqlitePool,
}

impl SqliteDocumentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_document(row: &sqlx::sqlite::SqliteRow) -> Document {
        let id: String = row.get("id");
        let tags_raw: Option<String> = row.get("tags");
        let metadata_raw: Option<String> = row.get("metadata");

        // Malformed stored JSON nulls the field rather than failing the read.
        let metadata = metadata_raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    subsystem = "db",
                    component = "documents",
                    document_id = %id,
                    error = %e,
                    "Stored metadata is not valid JSON; returning null"
                );
                None
            }
        });

        Document {
            id,
            title: row.get("title"),
            description: row.get("description"),
            content: row.get("content"),
            tags: split_tags(tags_raw.as_deref().unwrap_or_default()),
            metadata,
            file_path: row.get("file_path"),
            file_name: row.get("file_name"),
            file_extension: row.get("file_extension"),
            file_size: row.get("file_size"),
            mime_type: row.get("mime_type"),
            category: row.get("category"),
            document_type: row.get("document_type"),
            status: row.get("status"),
            created_by: row.get("created_by"),
            created_at: row.get("created_at"),
            updated_by: row.get("updated_by"),
            updated_at: row.get("updated_at"),
            fts_rank: row.get("fts_rank"),
            fts_last_updated: row.get("fts_last_updated"),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentRepository {
    async fn fetch(&self, id: &str) -> Result<Document> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(row) => Ok(Self::map_document(&row)),
            None => Err(Error::DocumentNotFound(id.to_string())),
        }
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?) AS present")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.get::<i64, _>("present") != 0)
    }

    async fn corpus_stats(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<CorpusStats> {
        let mut range_sql = String::new();
        if from.is_some() {
            range_sql.push_str(" AND created_at >= ?");
        }
        if to.is_some() {
            range_sql.push_str(" AND created_at <= ?");
        }

        let totals_sql = format!(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(status = 'active'), 0) AS active,
                   COALESCE(SUM(fts_content IS NOT NULL), 0) AS indexed,
                   COALESCE(SUM(file_size), 0) AS total_size,
                   COALESCE(AVG(file_size), 0.0) AS avg_size
            FROM documents
            WHERE 1 = 1{range_sql}
            "#
        );

        let mut totals = sqlx::query(&totals_sql);
        if let Some(from) = from {
            totals = totals.bind(from);
        }
        if let Some(to) = to {
            totals = totals.bind(to);
        }
        let totals = totals.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let by_category = self
            .bucket_counts("category", &range_sql, from, to)
            .await?;
        let by_type = self
            .bucket_counts("document_type", &range_sql, from, to)
            .await?;

        Ok(CorpusStats {
            total_documents: totals.get("total"),
            active_documents: totals.get("active"),
            indexed_documents: totals.get("indexed"),
            by_category,
            by_type,
            total_file_size: totals.get("total_size"),
            avg_file_size: totals.get("avg_size"),
        })
    }
}

impl SqliteDocumentRepository {
    /// Active-document counts grouped by `column` (category or type).
    async fn bucket_counts(
        &self,
        column: &str,
        range_sql: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<BucketCount>> {
        // `column` is one of two crate-internal identifiers, never user input.
        let sql = format!(
            r#"
            SELECT COALESCE({column}, 'uncategorized') AS name, COUNT(*) AS count
            FROM documents
            WHERE status = 'active'{range_sql}
            GROUP BY name
            ORDER BY count DESC, name ASC
            "#
        );

        let mut query = sqlx::query(&sql);
        if let Some(from) = from {
            query = query.bind(from);
        }
        if let Some(to) = to {
            query = query.bind(to);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| BucketCount {
                name: row.get("name"),
                count: row.get("count"),
            })
            .collect())
    }
}
