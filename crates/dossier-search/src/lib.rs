//! # dossier-search
//!
//! FTS5 search engine for dossier.
//!
//! This crate provides:
//! - Sanitized FTS5 match-expression construction
//! - Search orchestration: validate → compose → execute → format → paginate
//! - Combined-rank blending of stored and engine relevance
//! - Defensive result formatting for stored JSON columns
//! - Analytics event emission per executed search
//!
//! ## Example
//!
//! ```ignore
//! use dossier_search::SearchEngine;
//! use dossier_core::SearchRequest;
//! use dossier_db::Database;
//!
//! let db = Database::connect("sqlite://dossier.db").await?;
//! let engine = SearchEngine::new(db);
//!
//! let response = engine
//!     .search(Some("u-1"), &SearchRequest::new("marketing").with_limit(10))
//!     .await?;
//! ```

pub mod engine;
pub mod format;
pub mod query;

// Re-export core types
pub use dossier_core::*;

pub use engine::{is_non_increasing_by_rank, SearchEngine, SearchEngineConfig};
pub use format::{format_hit, parse_json_field};
pub use query::build_match_expr;
