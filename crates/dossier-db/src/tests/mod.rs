//! Integration tests over in-memory SQLite.

mod index_tests;

use crate::search::FtsQuery;
use dossier_core::{BlendWeights, SearchFilters, SortKey, SortOrder};

/// A relevance-sorted query over the seeded corpus with default knobs.
pub(crate) fn fts_query(match_expr: &str) -> FtsQuery {
    FtsQuery {
        match_expr: match_expr.to_string(),
        filters: SearchFilters::default(),
        sort_by: SortKey::Relevance,
        sort_order: SortOrder::Desc,
        limit: 20,
        offset: 0,
        weights: BlendWeights::default(),
        highlight: true,
        snippet_tokens: 20,
        open_tag: "<mark>".to_string(),
        close_tag: "</mark>".to_string(),
    }
}
