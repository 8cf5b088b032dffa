//! Search request, filter, and sort types.
//!
//! The HTTP layer deserializes straight into [`SearchRequest`];
//! [`SearchRequest::validate`] enforces every range constraint before any SQL
//! is composed, reporting all violations at once with per-field messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ValidationErrors;
use crate::Result;

// =============================================================================
// SORT
// =============================================================================

/// Result ordering key. `Relevance` orders by the combined rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    Title,
    CreatedAt,
    UpdatedAt,
    FtsRank,
    Bm25Score,
}

impl SortKey {
    /// Wire name of the key, as accepted/echoed by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Title => "title",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
            SortKey::FtsRank => "fts_rank",
            SortKey::Bm25Score => "bm25_score",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// SQL keyword for the direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Metadata filters AND-combined with the full-text match.
///
/// `status = 'active'` is always enforced by the query composer; an explicit
/// `status` filter here is combined on top of that guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Inclusive lower bound on `created_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on `created_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_to: Option<DateTime<Utc>>,

    /// Inclusive lower bound on `file_size` in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_file_size: Option<i64>,

    /// Inclusive upper bound on `file_size` in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<i64>,
}

impl SearchFilters {
    /// Create a new empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by document type.
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Filter by creator.
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Filter by file extension.
    pub fn with_file_extension(mut self, ext: impl Into<String>) -> Self {
        self.file_extension = Some(ext.into());
        self
    }

    /// Filter by MIME type.
    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    /// Filter by creation date range.
    pub fn with_created_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    /// Filter by file size range in bytes.
    pub fn with_file_size_range(mut self, min: i64, max: i64) -> Self {
        self.min_file_size = Some(min);
        self.max_file_size = Some(max);
        self
    }

    /// Check if no filter constraint is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.document_type.is_none()
            && self.status.is_none()
            && self.created_by.is_none()
            && self.file_extension.is_none()
            && self.mime_type.is_none()
            && self.created_from.is_none()
            && self.created_to.is_none()
            && self.min_file_size.is_none()
            && self.max_file_size.is_none()
    }

    fn validate_into(&self, errors: &mut ValidationErrors) {
        if let (Some(from), Some(to)) = (self.created_from, self.created_to) {
            if from > to {
                errors.push("filters.created_from", "must not be after created_to");
            }
        }
        if let Some(min) = self.min_file_size {
            if min < 0 {
                errors.push("filters.min_file_size", "must not be negative");
            }
        }
        if let Some(max) = self.max_file_size {
            if max < 0 {
                errors.push("filters.max_file_size", "must not be negative");
            }
        }
        if let (Some(min), Some(max)) = (self.min_file_size, self.max_file_size) {
            if min > max {
                errors.push("filters.min_file_size", "must not exceed max_file_size");
            }
        }
        if let Some(status) = &self.status {
            if status.trim().is_empty() {
                errors.push("filters.status", "must not be blank when present");
            }
        }
    }
}

// =============================================================================
// SEARCH REQUEST
// =============================================================================

/// A structured search request as received over the wire.
///
/// Optional fields fall back to the accessor defaults; [`Self::validate`]
/// rejects out-of-range values rather than clamping them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query, 1–500 characters after trimming.
    pub query: String,

    #[serde(default, skip_serializing_if = "SearchFilters::is_empty")]
    pub filters: SearchFilters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,

    /// Whether to compute a highlighted snippet per hit (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,

    /// Snippet budget in characters, 50–500.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_length: Option<i64>,
}

impl SearchRequest {
    /// Create a request for `query` with every option defaulted.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::default(),
            limit: None,
            offset: None,
            sort_by: None,
            sort_order: None,
            highlight: None,
            snippet_length: None,
        }
    }

    /// Set filters.
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Set page size.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set page offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set sort key and order.
    pub fn with_sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = Some(key);
        self.sort_order = Some(order);
        self
    }

    /// Enable or disable snippet highlighting.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Set the snippet character budget.
    pub fn with_snippet_length(mut self, len: i64) -> Self {
        self.snippet_length = Some(len);
        self
    }

    /// Trimmed query text.
    pub fn query(&self) -> &str {
        self.query.trim()
    }

    /// Effective page size.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(defaults::PAGE_LIMIT_SEARCH)
    }

    /// Effective page offset.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(defaults::PAGE_OFFSET)
    }

    /// Effective sort key.
    pub fn sort_by(&self) -> SortKey {
        self.sort_by.unwrap_or_default()
    }

    /// Effective sort order. Relevance and rank keys default to descending,
    /// everything else to ascending.
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or(match self.sort_by() {
            SortKey::Relevance | SortKey::FtsRank | SortKey::Bm25Score => SortOrder::Desc,
            SortKey::Title => SortOrder::Asc,
            SortKey::CreatedAt | SortKey::UpdatedAt => SortOrder::Desc,
        })
    }

    /// Whether hits carry a highlighted snippet.
    pub fn highlight(&self) -> bool {
        self.highlight.unwrap_or(true)
    }

    /// Effective snippet character budget.
    pub fn snippet_length(&self) -> i64 {
        self.snippet_length.unwrap_or(defaults::SNIPPET_LENGTH)
    }

    /// Validate every range constraint, reporting all violations at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        let query_len = self.query().chars().count();
        if query_len < defaults::QUERY_MIN_LEN {
            errors.push("query", "must not be empty");
        } else if query_len > defaults::QUERY_MAX_LEN {
            errors.push(
                "query",
                format!("must not exceed {} characters", defaults::QUERY_MAX_LEN),
            );
        }

        if let Some(limit) = self.limit {
            if !(1..=defaults::PAGE_LIMIT_MAX).contains(&limit) {
                errors.push(
                    "limit",
                    format!("must be between 1 and {}", defaults::PAGE_LIMIT_MAX),
                );
            }
        }

        if let Some(offset) = self.offset {
            if !(0..=defaults::PAGE_OFFSET_MAX).contains(&offset) {
                errors.push(
                    "offset",
                    format!("must be between 0 and {}", defaults::PAGE_OFFSET_MAX),
                );
            }
        }

        if let Some(len) = self.snippet_length {
            if !(defaults::SNIPPET_LENGTH_MIN..=defaults::SNIPPET_LENGTH_MAX).contains(&len) {
                errors.push(
                    "snippet_length",
                    format!(
                        "must be between {} and {}",
                        defaults::SNIPPET_LENGTH_MIN,
                        defaults::SNIPPET_LENGTH_MAX
                    ),
                );
            }
        }

        self.filters.validate_into(&mut errors);

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn field_names(err: Error) -> Vec<String> {
        match err {
            Error::Validation(errors) => errors.0.into_iter().map(|e| e.field).collect(),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let req = SearchRequest::new("marketing");
        assert_eq!(req.limit(), 20);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.sort_by(), SortKey::Relevance);
        assert_eq!(req.sort_order(), SortOrder::Desc);
        assert!(req.highlight());
        assert_eq!(req.snippet_length(), 160);
    }

    #[test]
    fn test_title_sort_defaults_ascending() {
        let req = SearchRequest::new("q").with_sort(SortKey::Title, SortOrder::Asc);
        assert_eq!(req.sort_order(), SortOrder::Asc);

        let mut req = SearchRequest::new("q");
        req.sort_by = Some(SortKey::Title);
        assert_eq!(req.sort_order(), SortOrder::Asc);
    }

    #[test]
    fn test_validate_ok() {
        let req = SearchRequest::new("marketing strategy")
            .with_limit(50)
            .with_offset(100)
            .with_snippet_length(200);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_query() {
        let req = SearchRequest::new("   ");
        let fields = field_names(req.validate().unwrap_err());
        assert_eq!(fields, vec!["query"]);
    }

    #[test]
    fn test_validate_query_too_long() {
        let req = SearchRequest::new("x".repeat(501));
        let fields = field_names(req.validate().unwrap_err());
        assert_eq!(fields, vec!["query"]);
    }

    #[test]
    fn test_validate_query_at_max_length() {
        let req = SearchRequest::new("x".repeat(500));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_limit_range() {
        assert!(SearchRequest::new("q").with_limit(0).validate().is_err());
        assert!(SearchRequest::new("q").with_limit(101).validate().is_err());
        assert!(SearchRequest::new("q").with_limit(1).validate().is_ok());
        assert!(SearchRequest::new("q").with_limit(100).validate().is_ok());
    }

    #[test]
    fn test_validate_offset_range() {
        assert!(SearchRequest::new("q").with_offset(-1).validate().is_err());
        assert!(SearchRequest::new("q").with_offset(1001).validate().is_err());
        assert!(SearchRequest::new("q").with_offset(1000).validate().is_ok());
    }

    #[test]
    fn test_validate_snippet_length_range() {
        assert!(SearchRequest::new("q")
            .with_snippet_length(49)
            .validate()
            .is_err());
        assert!(SearchRequest::new("q")
            .with_snippet_length(501)
            .validate()
            .is_err());
        assert!(SearchRequest::new("q")
            .with_snippet_length(50)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_reports_all_failures() {
        let req = SearchRequest::new("")
            .with_limit(0)
            .with_offset(5000)
            .with_snippet_length(10);
        let fields = field_names(req.validate().unwrap_err());
        assert_eq!(fields.len(), 4);
        assert!(fields.contains(&"query".to_string()));
        assert!(fields.contains(&"limit".to_string()));
        assert!(fields.contains(&"offset".to_string()));
        assert!(fields.contains(&"snippet_length".to_string()));
    }

    #[test]
    fn test_validate_date_range_ordering() {
        let from = "2024-06-01T00:00:00Z".parse().unwrap();
        let to = "2024-01-01T00:00:00Z".parse().unwrap();
        let req =
            SearchRequest::new("q").with_filters(SearchFilters::new().with_created_range(from, to));
        let fields = field_names(req.validate().unwrap_err());
        assert_eq!(fields, vec!["filters.created_from"]);
    }

    #[test]
    fn test_validate_file_size_range() {
        let req = SearchRequest::new("q")
            .with_filters(SearchFilters::new().with_file_size_range(1000, 10));
        let fields = field_names(req.validate().unwrap_err());
        assert_eq!(fields, vec!["filters.min_file_size"]);

        let req = SearchRequest::new("q").with_filters(SearchFilters {
            min_file_size: Some(-1),
            ..Default::default()
        });
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_blank_status_filter() {
        let req = SearchRequest::new("q").with_filters(SearchFilters {
            status: Some("  ".to_string()),
            ..Default::default()
        });
        let fields = field_names(req.validate().unwrap_err());
        assert_eq!(fields, vec!["filters.status"]);
    }

    #[test]
    fn test_filters_is_empty() {
        assert!(SearchFilters::new().is_empty());
        assert!(!SearchFilters::new().with_category("reports").is_empty());
    }

    #[test]
    fn test_sort_key_wire_names() {
        assert_eq!(SortKey::Relevance.as_str(), "relevance");
        assert_eq!(SortKey::Bm25Score.as_str(), "bm25_score");
        let key: SortKey = serde_json::from_str("\"created_at\"").unwrap();
        assert_eq!(key, SortKey::CreatedAt);
    }

    #[test]
    fn test_sort_order_sql() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_request_deserialization_minimal() {
        let req: SearchRequest = serde_json::from_str(r#"{"query": "marketing"}"#).unwrap();
        assert_eq!(req.query(), "marketing");
        assert!(req.filters.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_deserialization_full() {
        let json = r#"{
            "query": "quarterly report",
            "filters": {"category": "finance", "file_extension": "pdf"},
            "limit": 10,
            "offset": 20,
            "sort_by": "updated_at",
            "sort_order": "asc",
            "highlight": false,
            "snippet_length": 120
        }"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.filters.category.as_deref(), Some("finance"));
        assert_eq!(req.sort_by(), SortKey::UpdatedAt);
        assert_eq!(req.sort_order(), SortOrder::Asc);
        assert!(!req.highlight());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_filters_skip_serializing_empty() {
        let req = SearchRequest::new("q");
        let json = serde_json::to_value(&req).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("filters"));
        assert!(!obj.contains_key("limit"));
    }
}
