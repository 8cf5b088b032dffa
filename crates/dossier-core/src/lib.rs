//! # dossier-core
//!
//! Core types, traits, and abstractions for the dossier search service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other dossier crates depend on: the error type, search request and
//! filter types with range validation, rank-blend configuration, analytics
//! events, and repository traits.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod ranking;
pub mod search;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, FieldError, Result, ValidationErrors};
pub use events::{AnalyticsBus, AnalyticsReceiver, SearchEvent};
pub use models::*;
pub use ranking::BlendWeights;
pub use search::{SearchFilters, SearchRequest, SortKey, SortOrder};
pub use traits::*;
