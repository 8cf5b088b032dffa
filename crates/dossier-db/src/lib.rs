//! # dossier-db
//!
//! SQLite database layer for the dossier search service.
//!
//! This crate provides:
//! - Connection pool management (WAL, create-if-missing)
//! - Embedded migrations
//! - Document repository and corpus stats
//! - FTS5 index building with delta refresh and the `('rebuild')` pass
//! - Full-text query composition and execution
//! - Append-only search analytics with aggregate reporting
//! - Title-prefix suggestions
//!
//! ## Example
//!
//! ```rust,ignore
//! use dossier_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://dossier.db").await?;
//!     db.migrate().await?;
//!     let report = db.index.rebuild(false).await?;
//!     println!("indexed {} documents", report.document_count);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod documents;
pub mod index;
pub mod pool;
pub mod search;
pub mod suggestions;

#[cfg(test)]
mod tests;

// Test fixtures for integration tests.
// Always compiled so downstream crates' dev-dependencies can share the
// seeded corpus.
pub mod test_fixtures;

// Re-export core types
pub use dossier_core::*;

// Re-export repository implementations
pub use analytics::SqliteAnalyticsRepository;
pub use documents::SqliteDocumentRepository;
pub use index::FtsIndexBuilder;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use search::{FtsQuery, QueryParam, RawExcerpt, RawSearchRow, SqliteFtsSearch};
pub use suggestions::SqliteSuggestionRepository;

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Split a stored comma-separated tag list into trimmed, non-empty tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Combined database context with all repositories.
#[derive(Debug, Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::SqlitePool,
    /// Document repository.
    pub documents: SqliteDocumentRepository,
    /// Full-text search provider.
    pub search: SqliteFtsSearch,
    /// Search analytics repository.
    pub analytics: SqliteAnalyticsRepository,
    /// Title-prefix suggestion provider.
    pub suggestions: SqliteSuggestionRepository,
    /// FTS index builder. Clones share one rebuild lock.
    pub index: FtsIndexBuilder,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            documents: SqliteDocumentRepository::new(pool.clone()),
            search: SqliteFtsSearch::new(pool.clone()),
            analytics: SqliteAnalyticsRepository::new(pool.clone()),
            suggestions: SqliteSuggestionRepository::new(pool.clone()),
            index: FtsIndexBuilder::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }
}
