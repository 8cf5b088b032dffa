//! Full-text query composition and execution.
//!
//! Translates a composed [`FtsQuery`] into one parameterized SQL statement
//! joining the FTS5 virtual table back to the documents table: FTS `MATCH`,
//! AND-combined metadata filters, the combined-rank blend, snippet
//! extraction, and sort/paginate clauses. A parallel `COUNT(*)` query with
//! the same predicates produces the pagination total.
//!
//! Every result row is guaranteed `status = 'active'` and
//! `fts_content IS NOT NULL`; both predicates are baked into the statement
//! rather than left to callers.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use dossier_core::{BlendWeights, Error, Result, SearchFilters, SortKey, SortOrder};

/// A dynamically bound SQL parameter.
#[derive(Debug, Clone)]
pub enum QueryParam {
    Text(String),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
}

/// A fully composed search, ready to execute.
#[derive(Debug, Clone)]
pub struct FtsQuery {
    /// FTS5 MATCH expression (already sanitized; never raw user input).
    pub match_expr: String,
    pub filters: SearchFilters,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
    pub weights: BlendWeights,
    /// Whether to compute a highlighted snippet per row.
    pub highlight: bool,
    /// `snippet()` token budget, already mapped from the character budget.
    pub snippet_tokens: i64,
    pub open_tag: String,
    pub close_tag: String,
}

/// One raw result row before formatting.
///
/// `tags_raw` and `metadata_raw` are the stored column values; splitting and
/// defensive JSON parsing happen in the formatter.
#[derive(Debug, Clone)]
pub struct RawSearchRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags_raw: Option<String>,
    pub metadata_raw: Option<String>,
    pub category: Option<String>,
    pub document_type: Option<String>,
    pub file_name: Option<String>,
    pub file_extension: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub stored_rank: Option<f64>,
    pub engine_rank: f64,
    pub combined_rank: f64,
    pub snippet: Option<String>,
}

/// A raw single-document highlight/snippet row.
#[derive(Debug, Clone)]
pub struct RawExcerpt {
    pub id: String,
    pub title: String,
    pub excerpt: String,
}

/// Full-text search provider over the FTS5 index.
#[derive(Debug, Clone)]
pub struct SqliteFtsSearch {
    pool: SqlitePool,
}

impl SqliteFtsSearch {
    /// Create a new search provider with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Execute a composed search, returning the page of raw rows and the
    /// total match count.
    pub async fn execute(&self, query: &FtsQuery) -> Result<(Vec<RawSearchRow>, i64)> {
        let (filter_sql, filter_params) = build_filter_sql(&query.filters);

        // Parameter order mirrors placeholder order: SELECT expressions
        // first, then MATCH, filters, and the page window.
        let mut sql = String::from(
            r#"
            SELECT d.id, d.title, d.description, d.tags, d.metadata,
                   d.category, d.document_type,
                   d.file_name, d.file_extension, d.file_size, d.mime_type,
                   d.status, d.created_by, d.created_at, d.updated_at,
                   d.fts_rank AS stored_rank,
                   -bm25(documents_fts) AS engine_rank,
                   CASE WHEN d.fts_rank IS NOT NULL
                        THEN d.fts_rank * ? + (-bm25(documents_fts)) * ?
                        ELSE -bm25(documents_fts)
                   END AS combined_rank
            "#,
        );
        let mut params: Vec<QueryParam> = vec![
            QueryParam::Float(query.weights.stored),
            QueryParam::Float(query.weights.engine),
        ];

        if query.highlight {
            sql.push_str(", snippet(documents_fts, 2, ?, ?, '…', ?) AS snippet");
            params.push(QueryParam::Text(query.open_tag.clone()));
            params.push(QueryParam::Text(query.close_tag.clone()));
            params.push(QueryParam::Int(query.snippet_tokens));
        } else {
            sql.push_str(", NULL AS snippet");
        }

        sql.push_str(
            r#"
            FROM documents_fts
            JOIN documents d ON d.rowid = documents_fts.rowid
            WHERE documents_fts MATCH ?
              AND d.status = 'active'
              AND d.fts_content IS NOT NULL
            "#,
        );
        params.push(QueryParam::Text(query.match_expr.clone()));

        sql.push_str(&filter_sql);
        params.extend(filter_params.iter().cloned());

        sql.push_str(&format!(
            " ORDER BY {} {}, d.id ASC LIMIT ? OFFSET ?",
            sort_expr(query.sort_by),
            query.sort_order.as_sql()
        ));
        params.push(QueryParam::Int(query.limit));
        params.push(QueryParam::Int(query.offset));

        let rows = bind_params(sqlx::query(&sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let results = rows
            .iter()
            .map(|row| RawSearchRow {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                tags_raw: row.get("tags"),
                metadata_raw: row.get("metadata"),
                category: row.get("category"),
                document_type: row.get("document_type"),
                file_name: row.get("file_name"),
                file_extension: row.get("file_extension"),
                file_size: row.get("file_size"),
                mime_type: row.get("mime_type"),
                status: row.get("status"),
                created_by: row.get("created_by"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
                stored_rank: row.get("stored_rank"),
                engine_rank: row.get("engine_rank"),
                combined_rank: row.get("combined_rank"),
                snippet: row.get("snippet"),
            })
            .collect();

        let total = self.count(&query.match_expr, &filter_sql, &filter_params).await?;

        Ok((results, total))
    }

    async fn count(
        &self,
        match_expr: &str,
        filter_sql: &str,
        filter_params: &[QueryParam],
    ) -> Result<i64> {
        let sql = format!(
            r#"
            SELECT COUNT(*) AS total
            FROM documents_fts
            JOIN documents d ON d.rowid = documents_fts.rowid
            WHERE documents_fts MATCH ?
              AND d.status = 'active'
              AND d.fts_content IS NOT NULL
            {filter_sql}
            "#
        );

        let mut params = vec![QueryParam::Text(match_expr.to_string())];
        params.extend(filter_params.iter().cloned());

        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.get("total"))
    }

    /// Highlight every match in one document's indexed content.
    ///
    /// Returns `None` when the document does not exist, is not active, is
    /// not indexed, or does not match the expression.
    pub async fn highlight_document(
        &self,
        id: &str,
        match_expr: &str,
        open_tag: &str,
        close_tag: &str,
    ) -> Result<Option<RawExcerpt>> {
        let row = sqlx::query(
            r#"
            SELECT d.id, d.title, highlight(documents_fts, 2, ?, ?) AS excerpt
            FROM documents_fts
            JOIN documents d ON d.rowid = documents_fts.rowid
            WHERE documents_fts MATCH ?
              AND d.id = ?
              AND d.status = 'active'
              AND d.fts_content IS NOT NULL
            "#,
        )
        .bind(open_tag)
        .bind(close_tag)
        .bind(match_expr)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| RawExcerpt {
            id: row.get("id"),
            title: row.get("title"),
            excerpt: row.get("excerpt"),
        }))
    }

    /// Extract a bounded snippet around the best match in one document.
    pub async fn snippet_document(
        &self,
        id: &str,
        match_expr: &str,
        open_tag: &str,
        close_tag: &str,
        snippet_tokens: i64,
    ) -> Result<Option<RawExcerpt>> {
        let row = sqlx::query(
            r#"
            SELECT d.id, d.title, snippet(documents_fts, 2, ?, ?, '…', ?) AS excerpt
            FROM documents_fts
            JOIN documents d ON d.rowid = documents_fts.rowid
            WHERE documents_fts MATCH ?
              AND d.id = ?
              AND d.status = 'active'
              AND d.fts_content IS NOT NULL
            "#,
        )
        .bind(open_tag)
        .bind(close_tag)
        .bind(snippet_tokens)
        .bind(match_expr)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| RawExcerpt {
            id: row.get("id"),
            title: row.get("title"),
            excerpt: row.get("excerpt"),
        }))
    }
}

/// Render the filter map into AND-combined predicates and their parameters.
fn build_filter_sql(filters: &SearchFilters) -> (String, Vec<QueryParam>) {
    let mut sql = String::new();
    let mut params = Vec::new();

    if let Some(category) = &filters.category {
        sql.push_str(" AND d.category = ?");
        params.push(QueryParam::Text(category.clone()));
    }
    if let Some(document_type) = &filters.document_type {
        sql.push_str(" AND d.document_type = ?");
        params.push(QueryParam::Text(document_type.clone()));
    }
    if let Some(status) = &filters.status {
        // status = 'active' is already enforced; this narrows on top of it.
        sql.push_str(" AND d.status = ?");
        params.push(QueryParam::Text(status.clone()));
    }
    if let Some(created_by) = &filters.created_by {
        sql.push_str(" AND d.created_by = ?");
        params.push(QueryParam::Text(created_by.clone()));
    }
    if let Some(extension) = &filters.file_extension {
        sql.push_str(" AND LOWER(d.file_extension) = LOWER(?)");
        params.push(QueryParam::Text(extension.clone()));
    }
    if let Some(mime_type) = &filters.mime_type {
        sql.push_str(" AND d.mime_type = ?");
        params.push(QueryParam::Text(mime_type.clone()));
    }
    if let Some(from) = filters.created_from {
        sql.push_str(" AND d.created_at >= ?");
        params.push(QueryParam::Timestamp(from));
    }
    if let Some(to) = filters.created_to {
        sql.push_str(" AND d.created_at <= ?");
        params.push(QueryParam::Timestamp(to));
    }
    if let Some(min) = filters.min_file_size {
        sql.push_str(" AND d.file_size >= ?");
        params.push(QueryParam::Int(min));
    }
    if let Some(max) = filters.max_file_size {
        sql.push_str(" AND d.file_size <= ?");
        params.push(QueryParam::Int(max));
    }

    (sql, params)
}

/// SQL expression for a sort key. Direction is appended by the caller.
fn sort_expr(sort_by: SortKey) -> &'static str {
    match sort_by {
        SortKey::Relevance => "combined_rank",
        SortKey::Title => "d.title COLLATE NOCASE",
        SortKey::CreatedAt => "d.created_at",
        SortKey::UpdatedAt => "d.updated_at",
        SortKey::FtsRank => "stored_rank",
        SortKey::Bm25Score => "engine_rank",
    }
}

fn bind_params<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    params: &'q [QueryParam],
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    for param in params {
        query = match param {
            QueryParam::Text(value) => query.bind(value),
            QueryParam::Int(value) => query.bind(value),
            QueryParam::Float(value) => query.bind(value),
            QueryParam::Timestamp(value) => query.bind(value),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_sql_empty() {
        let (sql, params) = build_filter_sql(&SearchFilters::default());
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_build_filter_sql_and_combines_all() {
        let filters = SearchFilters::new()
            .with_category("reports")
            .with_document_type("proposal")
            .with_file_extension("pdf")
            .with_file_size_range(100, 10_000);
        let (sql, params) = build_filter_sql(&filters);

        assert_eq!(sql.matches(" AND ").count(), 5);
        assert!(sql.contains("d.category = ?"));
        assert!(sql.contains("d.document_type = ?"));
        assert!(sql.contains("LOWER(d.file_extension) = LOWER(?)"));
        assert!(sql.contains("d.file_size >= ?"));
        assert!(sql.contains("d.file_size <= ?"));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_sort_expr_mapping() {
        assert_eq!(sort_expr(SortKey::Relevance), "combined_rank");
        assert_eq!(sort_expr(SortKey::Title), "d.title COLLATE NOCASE");
        assert_eq!(sort_expr(SortKey::FtsRank), "stored_rank");
        assert_eq!(sort_expr(SortKey::Bm25Score), "engine_rank");
    }
}
