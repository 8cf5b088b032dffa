//! Test fixtures for integration tests.
//!
//! Always compiled so integration tests (in `tests/`) and downstream crates'
//! dev-dependencies can share one seeded corpus. The five sample documents
//! mirror the demo data of the original system; "Marketing Strategy 2024"
//! anchors the ranking assertions.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use dossier_core::{Error, Result};

use crate::Database;

/// ID of the seeded "Marketing Strategy 2024" document.
pub const MARKETING_DOC_ID: &str = "doc-marketing-strategy";

/// ID of the seeded archived document (never searchable).
pub const ARCHIVED_DOC_ID: &str = "doc-pricing-2022";

struct SeedDocument<'a> {
    id: &'a str,
    title: &'a str,
    description: Option<&'a str>,
    content: &'a str,
    tags: &'a str,
    metadata: Option<&'a str>,
    file_name: &'a str,
    file_extension: &'a str,
    file_size: i64,
    mime_type: &'a str,
    category: &'a str,
    document_type: &'a str,
    status: &'a str,
    created_by: &'a str,
    created_at: &'a str,
    fts_rank: Option<f64>,
}

const SEED_DOCUMENTS: &[SeedDocument<'static>] = &[
    SeedDocument {
        id: MARKETING_DOC_ID,
        title: "Marketing Strategy 2024",
        description: Some("Annual marketing strategy and campaign plan"),
        content: "This comprehensive marketing plan covers brand positioning, digital \
                  campaigns, and budget allocation for the 2024 fiscal year.",
        tags: "marketing,strategy,2024",
        metadata: Some(r#"{"client": "Internal", "owner": "dana"}"#),
        file_name: "marketing-strategy-2024.pdf",
        file_extension: "pdf",
        file_size: 482_133,
        mime_type: "application/pdf",
        category: "marketing",
        document_type: "strategy",
        status: "active",
        created_by: "dana",
        created_at: "2024-01-15T09:30:00Z",
        fts_rank: Some(4.0),
    },
    SeedDocument {
        id: "doc-eng-roadmap",
        title: "Engineering Roadmap Q3",
        description: Some("Platform milestones and delivery plan for Q3"),
        content: "Milestones for the search service, the analytics pipeline, and the \
                  document ingestion rework.",
        tags: "engineering,roadmap",
        metadata: Some(r#"{"team": "platform"}"#),
        file_name: "eng-roadmap-q3.docx",
        file_extension: "docx",
        file_size: 88_412,
        mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        category: "engineering",
        document_type: "roadmap",
        status: "active",
        created_by: "lee",
        created_at: "2024-02-20T14:05:00Z",
        fts_rank: None,
    },
    SeedDocument {
        id: "doc-budget-fy25",
        title: "Budget Proposal FY25",
        description: Some("Cost projections and headcount planning"),
        content: "Cost projections, marketing budget breakdown, and headcount planning \
                  for the coming fiscal year.",
        tags: "finance,budget,proposal",
        metadata: Some(r#"{"approver": "cfo"}"#),
        file_name: "budget-proposal-fy25.pdf",
        file_extension: "pdf",
        file_size: 1_204_990,
        mime_type: "application/pdf",
        category: "finance",
        document_type: "proposal",
        status: "active",
        created_by: "dana",
        created_at: "2024-03-02T11:45:00Z",
        fts_rank: Some(2.5),
    },
    SeedDocument {
        id: "doc-onboarding-guide",
        title: "Customer Onboarding Guide",
        description: None,
        content: "Step by step guide for onboarding new customers to the platform, \
                  including account setup and first-project walkthroughs.",
        tags: "support,onboarding",
        metadata: None,
        file_name: "customer-onboarding.md",
        file_extension: "md",
        file_size: 24_004,
        mime_type: "text/markdown",
        category: "support",
        document_type: "guide",
        status: "active",
        created_by: "kim",
        created_at: "2024-03-28T08:10:00Z",
        fts_rank: None,
    },
    SeedDocument {
        id: ARCHIVED_DOC_ID,
        title: "Archived Pricing Sheet 2022",
        description: Some("Superseded pricing; kept for reference"),
        content: "Legacy pricing for marketing bundles and enterprise tiers, retired \
                  at the end of 2022.",
        tags: "pricing,archive",
        metadata: None,
        file_name: "pricing-2022.xlsx",
        file_extension: "xlsx",
        file_size: 51_220,
        mime_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        category: "sales",
        document_type: "pricing",
        status: "archived",
        created_by: "kim",
        created_at: "2022-11-01T16:00:00Z",
        fts_rank: Some(1.0),
    },
];

/// Open a fresh in-memory database with migrations applied.
///
/// The pool is capped at one connection: every connection to
/// `sqlite::memory:` would otherwise get its own private database.
pub async fn memory_db() -> Result<Database> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(Error::Database)?;
    let db = Database::new(pool);
    db.migrate().await?;
    Ok(db)
}

/// Insert the five sample documents and build the index.
pub async fn seed_sample_documents(db: &Database) -> Result<()> {
    for doc in SEED_DOCUMENTS {
        let created_at: DateTime<Utc> = doc
            .created_at
            .parse()
            .map_err(|e| Error::Internal(format!("bad fixture timestamp: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO documents
                (id, title, description, content, tags, metadata,
                 file_path, file_name, file_extension, file_size, mime_type,
                 category, document_type, status,
                 created_by, created_at, updated_by, updated_at, fts_rank)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(doc.id)
        .bind(doc.title)
        .bind(doc.description)
        .bind(doc.content)
        .bind(doc.tags)
        .bind(doc.metadata)
        .bind(format!("/files/{}", doc.file_name))
        .bind(doc.file_name)
        .bind(doc.file_extension)
        .bind(doc.file_size)
        .bind(doc.mime_type)
        .bind(doc.category)
        .bind(doc.document_type)
        .bind(doc.status)
        .bind(doc.created_by)
        .bind(created_at)
        .bind(created_at)
        .bind(doc.fts_rank)
        .execute(db.pool())
        .await
        .map_err(Error::Database)?;
    }

    db.index.rebuild(false).await?;
    Ok(())
}

/// Convenience: fresh in-memory database, migrated and seeded.
pub async fn seeded_memory_db() -> Result<Database> {
    let db = memory_db().await?;
    seed_sample_documents(&db).await?;
    Ok(db)
}
