//! Core traits for dossier abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::events::SearchEvent;
use crate::models::*;

// =============================================================================
// DOCUMENT STORE
// =============================================================================

/// Read access to document rows.
///
/// Document writes happen in external flows; the search subsystem only reads.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a full document by ID.
    async fn fetch(&self, id: &str) -> Result<Document>;

    /// Check whether a document exists (any status).
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Corpus-wide counts over an optional `created_at` window.
    async fn corpus_stats(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<CorpusStats>;
}

// =============================================================================
// ANALYTICS STORE
// =============================================================================

/// Append-only search analytics log with aggregate reporting.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Record one executed search. Rows are never updated or deleted.
    async fn record(&self, event: &SearchEvent) -> Result<()>;

    /// Aggregate the log over `range`, returning at most `top_terms`
    /// leaderboard entries. Empty ranges yield empty vectors, not errors.
    async fn report(&self, range: ReportRange, top_terms: i64) -> Result<SearchAnalyticsReport>;
}
