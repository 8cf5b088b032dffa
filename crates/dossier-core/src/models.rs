//! Core data models for dossier.
//!
//! These types are shared across all dossier crates and represent the core
//! domain entities: documents, search hits, pagination, and the analytics
//! report shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// A document row as the search subsystem sees it.
///
/// Document rows are written by external flows (upload, template-proposal);
/// this crate only reads them. `tags` is already split from the stored
/// comma-separated column; `metadata` is `None` when the stored JSON blob is
/// absent or unparseable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Option<JsonValue>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_extension: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub category: Option<String>,
    pub document_type: Option<String>,
    /// Free-text status; only `active` documents are searchable.
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Stored editorial rank blended into relevance scoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fts_rank: Option<f64>,
    /// When the FTS projection of this row was last recomputed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fts_last_updated: Option<DateTime<Utc>>,
}

/// One search result row after formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Always `active`; the query composer bakes the restriction in.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Stored editorial rank, when one exists for the row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_rank: Option<f64>,
    /// Engine relevance (negated BM25, larger is better).
    pub engine_rank: f64,
    /// Blend of stored and engine rank; the relevance sort key.
    pub combined_rank: f64,
    /// Highlighted snippet, present when the request asked for one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Pagination metadata for search responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Total number of rows matching the query (across all pages).
    pub total: i64,
    /// Maximum number of rows per page (request parameter).
    pub limit: i64,
    /// Number of rows skipped (request parameter).
    pub offset: i64,
    /// True if more rows are available after this page.
    pub has_next: bool,
    /// True if rows precede this page.
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Build pagination metadata from the request window and total count.
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        Self {
            total,
            limit,
            offset,
            has_next: offset + limit < total,
            has_prev: offset > 0,
        }
    }
}

// =============================================================================
// SEARCH RESPONSE
// =============================================================================

/// Echo of the executed search, returned alongside the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEcho {
    pub query: String,
    pub filters: JsonValue,
    pub sort_by: String,
    pub sort_order: String,
}

/// Timing breakdown for one search request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchTiming {
    /// Time spent executing SQL.
    pub query_ms: u64,
    /// End-to-end time including validation and formatting.
    pub total_ms: u64,
}

/// Full response envelope for a search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub pagination: PaginationMeta,
    pub search: SearchEcho,
    pub timing: SearchTiming,
}

// =============================================================================
// INDEX REBUILD
// =============================================================================

/// Outcome of an index rebuild.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexRebuildReport {
    /// Documents present in the index after the rebuild. Stable across
    /// back-to-back rebuilds with no intervening document changes.
    pub document_count: i64,
    /// Wall-clock rebuild duration.
    pub rebuild_time_ms: u64,
    /// Whether the rebuild refreshed every row regardless of staleness.
    pub forced: bool,
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// One autocomplete suggestion with its usage frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion: String,
    /// How often this exact term appears in the search analytics log.
    pub frequency: i64,
}

// =============================================================================
// ANALYTICS REPORT TYPES
// =============================================================================

/// Per-day search activity totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySearchStats {
    /// Day in `YYYY-MM-DD` form.
    pub day: String,
    pub search_count: i64,
    pub avg_time_ms: f64,
    pub min_time_ms: i64,
    pub max_time_ms: i64,
    pub distinct_users: i64,
    pub distinct_terms: i64,
}

/// One entry of the top-terms leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopSearchTerm {
    pub term: String,
    pub search_count: i64,
    pub avg_results: f64,
    pub last_used: DateTime<Utc>,
}

/// Per-user search totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSearchStats {
    pub user_id: String,
    pub search_count: i64,
    pub avg_time_ms: f64,
}

/// How often a filter key appeared across logged searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterUsage {
    pub filter: String,
    pub count: i64,
}

/// Date window an analytics report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Aggregated search analytics over a date range.
///
/// Empty ranges produce empty vectors, never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAnalyticsReport {
    pub range: ReportRange,
    pub daily: Vec<DailySearchStats>,
    pub top_terms: Vec<TopSearchTerm>,
    pub users: Vec<UserSearchStats>,
    pub filter_usage: Vec<FilterUsage>,
}

// =============================================================================
// CORPUS STATS
// =============================================================================

/// Count of documents in one category or type bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub name: String,
    pub count: i64,
}

/// Corpus-wide document counts and sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: i64,
    pub active_documents: i64,
    /// Documents currently present in the FTS index.
    pub indexed_documents: i64,
    pub by_category: Vec<BucketCount>,
    pub by_type: Vec<BucketCount>,
    pub total_file_size: i64,
    pub avg_file_size: f64,
}

// =============================================================================
// SINGLE-DOCUMENT HIGHLIGHT / SNIPPET
// =============================================================================

/// Highlighted content excerpt for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentExcerpt {
    pub id: String,
    pub title: String,
    /// Highlighted full column or bounded snippet, per the requested mode.
    pub excerpt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_first_page() {
        let meta = PaginationMeta::new(100, 20, 0);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_pagination_middle_page() {
        let meta = PaginationMeta::new(100, 20, 40);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_last_page() {
        let meta = PaginationMeta::new(100, 20, 80);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_exact_boundary() {
        // offset + limit == total → no next page
        let meta = PaginationMeta::new(40, 20, 20);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_empty_result() {
        let meta = PaginationMeta::new(0, 20, 0);
        assert_eq!(meta.total, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_search_hit_serialization_skips_empty_options() {
        let hit = SearchHit {
            id: "doc-1".into(),
            title: "Title".into(),
            description: None,
            tags: vec![],
            metadata: None,
            category: None,
            document_type: None,
            file_name: None,
            file_extension: None,
            file_size: None,
            mime_type: None,
            status: "active".into(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: None,
            stored_rank: None,
            engine_rank: 1.5,
            combined_rank: 1.5,
            snippet: None,
        };
        let json = serde_json::to_value(&hit).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("snippet"));
        assert!(!obj.contains_key("stored_rank"));
        assert!(obj.contains_key("combined_rank"));
    }

    #[test]
    fn test_rebuild_report_roundtrip() {
        let report = IndexRebuildReport {
            document_count: 5,
            rebuild_time_ms: 12,
            forced: true,
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: IndexRebuildReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.document_count, 5);
        assert!(back.forced);
    }
}
