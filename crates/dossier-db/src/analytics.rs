//! Search analytics: append-only log and aggregate reporting.
//!
//! One row per executed search. The log is never read back into the query
//! path; the aggregator produces per-day totals, a top-terms leaderboard,
//! per-user counts, and a filter-usage histogram over the stored filter
//! JSON (via `json_each`).

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use dossier_core::{
    AnalyticsStore, DailySearchStats, Error, FilterUsage, ReportRange, Result,
    SearchAnalyticsReport, SearchEvent, TopSearchTerm, UserSearchStats,
};

/// Analytics repository over a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteAnalyticsRepository {
    pool: SqlitePool,
}

impl SqliteAnalyticsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn daily(&self, range: &ReportRange) -> Result<Vec<DailySearchStats>> {
        let rows = sqlx::query(
            r#"
            SELECT date(created_at) AS day,
                   COUNT(*) AS search_count,
                   AVG(search_time_ms) AS avg_time_ms,
                   MIN(search_time_ms) AS min_time_ms,
                   MAX(search_time_ms) AS max_time_ms,
                   COUNT(DISTINCT user_id) AS distinct_users,
                   COUNT(DISTINCT search_term) AS distinct_terms
            FROM search_analytics
            WHERE created_at >= ? AND created_at <= ?
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| DailySearchStats {
                day: row.get("day"),
                search_count: row.get("search_count"),
                avg_time_ms: row.get("avg_time_ms"),
                min_time_ms: row.get("min_time_ms"),
                max_time_ms: row.get("max_time_ms"),
                distinct_users: row.get("distinct_users"),
                distinct_terms: row.get("distinct_terms"),
            })
            .collect())
    }

    async fn top_terms(&self, range: &ReportRange, limit: i64) -> Result<Vec<TopSearchTerm>> {
        let rows = sqlx::query(
            r#"
            SELECT search_term,
                   COUNT(*) AS search_count,
                   AVG(result_count) AS avg_results,
                   MAX(created_at) AS last_used
            FROM search_analytics
            WHERE created_at >= ? AND created_at <= ?
            GROUP BY search_term
            ORDER BY search_count DESC, search_term ASC
            LIMIT ?
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| TopSearchTerm {
                term: row.get("search_term"),
                search_count: row.get("search_count"),
                avg_results: row.get("avg_results"),
                last_used: row.get("last_used"),
            })
            .collect())
    }

    async fn users(&self, range: &ReportRange) -> Result<Vec<UserSearchStats>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id,
                   COUNT(*) AS search_count,
                   AVG(search_time_ms) AS avg_time_ms
            FROM search_analytics
            WHERE created_at >= ? AND created_at <= ?
              AND user_id IS NOT NULL
            GROUP BY user_id
            ORDER BY search_count DESC, user_id ASC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| UserSearchStats {
                user_id: row.get("user_id"),
                search_count: row.get("search_count"),
                avg_time_ms: row.get("avg_time_ms"),
            })
            .collect())
    }

    async fn filter_usage(&self, range: &ReportRange) -> Result<Vec<FilterUsage>> {
        let rows = sqlx::query(
            r#"
            SELECT je.key AS filter, COUNT(*) AS count
            FROM search_analytics sa, json_each(sa.filters) je
            WHERE sa.created_at >= ? AND sa.created_at <= ?
            GROUP BY je.key
            ORDER BY count DESC, filter ASC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| FilterUsage {
                filter: row.get("filter"),
                count: row.get("count"),
            })
            .collect())
    }
}

#[async_trait]
impl AnalyticsStore for SqliteAnalyticsRepository {
    async fn record(&self, event: &SearchEvent) -> Result<()> {
        let filters = serde_json::to_string(&event.filters)?;

        sqlx::query(
            r#"
            INSERT INTO search_analytics
                (search_term, filters, user_id, result_count, search_time_ms, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.search_term)
        .bind(&filters)
        .bind(&event.user_id)
        .bind(event.result_count)
        .bind(event.search_time_ms)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn report(&self, range: ReportRange, top_terms: i64) -> Result<SearchAnalyticsReport> {
        Ok(SearchAnalyticsReport {
            range,
            daily: self.daily(&range).await?,
            top_terms: self.top_terms(&range, top_terms).await?,
            users: self.users(&range).await?,
            filter_usage: self.filter_usage(&range).await?,
        })
    }
}
