//! Centralized default constants for the dossier system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// QUERY VALIDATION
// =============================================================================

/// Minimum search query length in characters.
pub const QUERY_MIN_LEN: usize = 1;

/// Maximum search query length in characters.
pub const QUERY_MAX_LEN: usize = 500;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for search endpoints.
pub const PAGE_LIMIT_SEARCH: i64 = 20;

/// Maximum page size accepted from a request.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

/// Maximum page offset accepted from a request.
pub const PAGE_OFFSET_MAX: i64 = 1000;

/// Default page size for suggestion/autocomplete endpoints.
pub const PAGE_LIMIT_SUGGESTIONS: i64 = 10;

// =============================================================================
// SNIPPETS & HIGHLIGHTING
// =============================================================================

/// Default snippet length in characters for search results.
pub const SNIPPET_LENGTH: i64 = 160;

/// Minimum snippet length accepted from a request.
pub const SNIPPET_LENGTH_MIN: i64 = 50;

/// Maximum snippet length accepted from a request.
pub const SNIPPET_LENGTH_MAX: i64 = 500;

/// FTS5 `snippet()` token ceiling (engine-imposed).
pub const SNIPPET_TOKENS_MAX: i64 = 64;

/// Approximate characters per token used to map a character budget onto the
/// `snippet()` token argument.
pub const SNIPPET_CHARS_PER_TOKEN: i64 = 8;

/// Default opening tag wrapped around matched terms.
pub const HIGHLIGHT_OPEN_TAG: &str = "<mark>";

/// Default closing tag wrapped around matched terms.
pub const HIGHLIGHT_CLOSE_TAG: &str = "</mark>";

// =============================================================================
// RANKING
// =============================================================================

/// Default weight applied to the stored (editorial) rank when blending.
pub const STORED_RANK_WEIGHT: f64 = 0.7;

/// Default weight applied to the engine (BM25) rank when blending.
pub const ENGINE_RANK_WEIGHT: f64 = 0.3;

// =============================================================================
// ANALYTICS
// =============================================================================

/// Default number of top search terms returned by the analytics report.
pub const ANALYTICS_TOP_TERMS: i64 = 10;

/// Default reporting window in days when no date range is given.
pub const ANALYTICS_RANGE_DAYS: i64 = 30;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Maximum request body size in bytes (search bodies are small).
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Searches slower than this are logged with the `slow` marker.
pub const SLOW_SEARCH_MS: u64 = 500;
