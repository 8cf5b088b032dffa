//! Search engine orchestration.
//!
//! [`SearchEngine`] ties the pipeline together: validate the request,
//! build the match expression, execute the composed SQL, format the rows,
//! assemble pagination, and emit one analytics event per executed search.
//! Analytics are fire-and-forget through the [`AnalyticsBus`]; the response
//! never waits on the log write.

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use dossier_core::{
    defaults, AnalyticsBus, BlendWeights, DocumentExcerpt, Error, PaginationMeta, ReportRange,
    Result, SearchAnalyticsReport, SearchEcho, SearchEvent, SearchHit, SearchRequest,
    SearchResponse, SearchTiming, Suggestion, ValidationErrors,
};
use dossier_db::{Database, FtsQuery};

use crate::format::format_hit;
use crate::query::build_match_expr;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct SearchEngineConfig {
    /// Stored/engine weights for combined-rank blending.
    pub weights: BlendWeights,
    /// Default opening highlight tag.
    pub open_tag: String,
    /// Default closing highlight tag.
    pub close_tag: String,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            weights: BlendWeights::default(),
            open_tag: defaults::HIGHLIGHT_OPEN_TAG.to_string(),
            close_tag: defaults::HIGHLIGHT_CLOSE_TAG.to_string(),
        }
    }
}

impl SearchEngineConfig {
    /// Create a config with custom blend weights.
    pub fn with_weights(weights: BlendWeights) -> Self {
        Self {
            weights,
            ..Default::default()
        }
    }
}

/// Full-text search engine over the documents index.
#[derive(Clone)]
pub struct SearchEngine {
    db: Database,
    config: SearchEngineConfig,
    analytics: Option<AnalyticsBus>,
}

impl SearchEngine {
    /// Create a new engine with default configuration and no analytics.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            config: SearchEngineConfig::default(),
            analytics: None,
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: SearchEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach the analytics bus; every executed search emits one event.
    pub fn with_analytics(mut self, bus: AnalyticsBus) -> Self {
        self.analytics = Some(bus);
        self
    }

    /// Execute a search request for an optional authenticated user.
    pub async fn search(
        &self,
        user_id: Option<&str>,
        req: &SearchRequest,
    ) -> Result<SearchResponse> {
        let total_timer = Instant::now();
        req.validate()?;

        let limit = req.limit();
        let offset = req.offset();
        let echo = SearchEcho {
            query: req.query().to_string(),
            filters: serde_json::to_value(&req.filters)?,
            sort_by: req.sort_by().as_str().to_string(),
            sort_order: match req.sort_order() {
                dossier_core::SortOrder::Asc => "asc".to_string(),
                dossier_core::SortOrder::Desc => "desc".to_string(),
            },
        };

        // A query with no searchable tokens cannot reach MATCH; it is a
        // legal request that matches nothing.
        let Some(match_expr) = build_match_expr(req.query()) else {
            let response = SearchResponse {
                results: Vec::new(),
                pagination: PaginationMeta::new(0, limit, offset),
                search: echo,
                timing: SearchTiming {
                    query_ms: 0,
                    total_ms: total_timer.elapsed().as_millis() as u64,
                },
            };
            self.emit_event(user_id, req, 0, 0);
            return Ok(response);
        };

        let fts_query = FtsQuery {
            match_expr,
            filters: req.filters.clone(),
            sort_by: req.sort_by(),
            sort_order: req.sort_order(),
            limit,
            offset,
            weights: self.config.weights,
            highlight: req.highlight(),
            snippet_tokens: snippet_tokens(req.snippet_length()),
            open_tag: self.config.open_tag.clone(),
            close_tag: self.config.close_tag.clone(),
        };

        let query_timer = Instant::now();
        let (rows, total) = self.db.search.execute(&fts_query).await?;
        let query_ms = query_timer.elapsed().as_millis() as u64;

        let results: Vec<SearchHit> = rows.into_iter().map(format_hit).collect();

        let timing = SearchTiming {
            query_ms,
            total_ms: total_timer.elapsed().as_millis() as u64,
        };

        debug!(
            subsystem = "search",
            component = "engine",
            op = "search",
            query = %req.query(),
            sort_key = req.sort_by().as_str(),
            result_count = total,
            duration_ms = timing.total_ms,
            "Search executed"
        );
        if timing.total_ms > defaults::SLOW_SEARCH_MS {
            warn!(
                subsystem = "search",
                component = "engine",
                query = %req.query(),
                duration_ms = timing.total_ms,
                slow = true,
                "Slow search"
            );
        }

        self.emit_event(user_id, req, total, query_ms as i64);

        Ok(SearchResponse {
            results,
            pagination: PaginationMeta::new(total, limit, offset),
            search: echo,
            timing,
        })
    }

    /// Title-prefix suggestions with analytics frequency counts.
    pub async fn suggest(&self, prefix: &str, limit: Option<i64>) -> Result<Vec<Suggestion>> {
        let mut errors = ValidationErrors::new();
        let prefix = prefix.trim();
        if prefix.is_empty() {
            errors.push("q", "must not be empty");
        } else if prefix.chars().count() > defaults::QUERY_MAX_LEN {
            errors.push(
                "q",
                format!("must not exceed {} characters", defaults::QUERY_MAX_LEN),
            );
        }
        let limit = limit.unwrap_or(defaults::PAGE_LIMIT_SUGGESTIONS);
        if !(1..=defaults::PAGE_LIMIT_MAX).contains(&limit) {
            errors.push(
                "limit",
                format!("must be between 1 and {}", defaults::PAGE_LIMIT_MAX),
            );
        }
        errors.into_result()?;

        self.db.suggestions.suggest(prefix, limit).await
    }

    /// Highlight every match in one document's indexed content.
    pub async fn highlight(
        &self,
        id: &str,
        query: &str,
        open_tag: Option<&str>,
        close_tag: Option<&str>,
    ) -> Result<DocumentExcerpt> {
        let match_expr = self.single_document_expr(query)?;
        let raw = self
            .db
            .search
            .highlight_document(
                id,
                &match_expr,
                open_tag.unwrap_or(&self.config.open_tag),
                close_tag.unwrap_or(&self.config.close_tag),
            )
            .await?;

        match raw {
            Some(raw) => Ok(DocumentExcerpt {
                id: raw.id,
                title: raw.title,
                excerpt: raw.excerpt,
            }),
            None => Err(Error::DocumentNotFound(id.to_string())),
        }
    }

    /// Extract a bounded, highlighted snippet from one document.
    pub async fn snippet(
        &self,
        id: &str,
        query: &str,
        snippet_length: Option<i64>,
        open_tag: Option<&str>,
        close_tag: Option<&str>,
    ) -> Result<DocumentExcerpt> {
        let length = snippet_length.unwrap_or(defaults::SNIPPET_LENGTH);
        let mut errors = ValidationErrors::new();
        if !(defaults::SNIPPET_LENGTH_MIN..=defaults::SNIPPET_LENGTH_MAX).contains(&length) {
            errors.push(
                "snippet_length",
                format!(
                    "must be between {} and {}",
                    defaults::SNIPPET_LENGTH_MIN,
                    defaults::SNIPPET_LENGTH_MAX
                ),
            );
        }
        errors.into_result()?;

        let match_expr = self.single_document_expr(query)?;
        let raw = self
            .db
            .search
            .snippet_document(
                id,
                &match_expr,
                open_tag.unwrap_or(&self.config.open_tag),
                close_tag.unwrap_or(&self.config.close_tag),
                snippet_tokens(length),
            )
            .await?;

        match raw {
            Some(raw) => Ok(DocumentExcerpt {
                id: raw.id,
                title: raw.title,
                excerpt: raw.excerpt,
            }),
            None => Err(Error::DocumentNotFound(id.to_string())),
        }
    }

    /// Aggregate search analytics over an optional date window.
    ///
    /// Missing bounds default to the last [`defaults::ANALYTICS_RANGE_DAYS`]
    /// days ending now.
    pub async fn analytics_report(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        top_terms: Option<i64>,
    ) -> Result<SearchAnalyticsReport> {
        use dossier_core::AnalyticsStore;

        let mut errors = ValidationErrors::new();
        let to = to.unwrap_or_else(Utc::now);
        let from = from.unwrap_or(to - Duration::days(defaults::ANALYTICS_RANGE_DAYS));
        if from > to {
            errors.push("date_from", "must not be after date_to");
        }
        let top_terms = top_terms.unwrap_or(defaults::ANALYTICS_TOP_TERMS);
        if !(1..=defaults::PAGE_LIMIT_MAX).contains(&top_terms) {
            errors.push(
                "limit",
                format!("must be between 1 and {}", defaults::PAGE_LIMIT_MAX),
            );
        }
        errors.into_result()?;

        self.db
            .analytics
            .report(ReportRange { from, to }, top_terms)
            .await
    }

    /// The underlying database context.
    pub fn db(&self) -> &Database {
        &self.db
    }

    fn single_document_expr(&self, query: &str) -> Result<String> {
        let trimmed = query.trim();
        let mut errors = ValidationErrors::new();
        if trimmed.is_empty() {
            errors.push("q", "must not be empty");
        } else if trimmed.chars().count() > defaults::QUERY_MAX_LEN {
            errors.push(
                "q",
                format!("must not exceed {} characters", defaults::QUERY_MAX_LEN),
            );
        }
        errors.into_result()?;

        build_match_expr(trimmed).ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.push("q", "contains no searchable terms");
            Error::Validation(errors)
        })
    }

    fn emit_event(&self, user_id: Option<&str>, req: &SearchRequest, total: i64, query_ms: i64) {
        let Some(bus) = &self.analytics else {
            return;
        };
        let filters = serde_json::to_value(&req.filters).unwrap_or_else(|_| serde_json::json!({}));
        bus.emit(SearchEvent {
            search_term: req.query().to_string(),
            filters,
            user_id: user_id.map(String::from),
            result_count: total,
            search_time_ms: query_ms,
            occurred_at: Utc::now(),
        });
    }
}

/// Map a snippet character budget onto the FTS5 `snippet()` token argument.
fn snippet_tokens(snippet_chars: i64) -> i64 {
    (snippet_chars / defaults::SNIPPET_CHARS_PER_TOKEN)
        .max(1)
        .min(defaults::SNIPPET_TOKENS_MAX)
}

/// Relevance ordering helper shared by tests and callers that re-sort.
pub fn is_non_increasing_by_rank(hits: &[SearchHit]) -> bool {
    hits.windows(2)
        .all(|pair| pair[0].combined_rank >= pair[1].combined_rank)
}
