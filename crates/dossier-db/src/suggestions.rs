//! Title-prefix suggestions.
//!
//! Suggestions come from active, indexed document titles; each carries a
//! frequency count of analytics rows whose search term equals the title, so
//! titles people actually search for sort first.

use sqlx::{Row, SqlitePool};

use dossier_core::{Error, Result, Suggestion};

use crate::escape_like;

/// Suggestion provider over a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteSuggestionRepository {
    pool: SqlitePool,
}

impl SqliteSuggestionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Titles of active, indexed documents starting with `prefix`
    /// (case-insensitive), ordered by analytics frequency then title.
    pub async fn suggest(&self, prefix: &str, limit: i64) -> Result<Vec<Suggestion>> {
        let pattern = format!("{}%", escape_like(prefix));

        let rows = sqlx::query(
            r#"
            SELECT d.title AS suggestion,
                   (SELECT COUNT(*) FROM search_analytics a
                     WHERE LOWER(a.search_term) = LOWER(d.title)) AS frequency
            FROM documents d
            WHERE d.status = 'active'
              AND d.fts_content IS NOT NULL
              AND d.title LIKE ? ESCAPE '\'
            GROUP BY d.title
            ORDER BY frequency DESC, d.title ASC
            LIMIT ?
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| Suggestion {
                suggestion: row.get("suggestion"),
                frequency: row.get("frequency"),
            })
            .collect())
    }
}
