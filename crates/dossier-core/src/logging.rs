//! Structured logging schema and field name constants for dossier.
//!
//! All crates use these constants for consistent structured logging fields.
//! This ensures log aggregation tools (Loki, Elasticsearch) can query by
//! standardized field names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (search hits) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → handler → sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "search", "db", "analytics"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "engine", "index_builder", "pool", "analytics_writer"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "rebuild", "record", "aggregate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document ID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Authenticated user ID on whose behalf an operation runs.
pub const USER_ID: &str = "user_id";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of documents touched by an index pass.
pub const DOCUMENT_COUNT: &str = "document_count";

// ─── Search-specific fields ────────────────────────────────────────────────

/// Weight applied to the stored rank in the combined-rank blend.
pub const STORED_WEIGHT: &str = "stored_weight";

/// Weight applied to the engine rank in the combined-rank blend.
pub const ENGINE_WEIGHT: &str = "engine_weight";

/// Sort key used for result ordering.
pub const SORT_KEY: &str = "sort_key";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
