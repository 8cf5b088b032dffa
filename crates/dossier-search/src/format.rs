//! Result formatting: raw database rows into typed response objects.
//!
//! Tag lists split on commas; JSON columns parse defensively. A malformed
//! stored blob nulls that field for the row — the row and the page survive,
//! because one bad write must not take down every search that touches it.

use serde_json::Value as JsonValue;
use tracing::warn;

use dossier_core::SearchHit;
use dossier_db::{split_tags, RawSearchRow};

/// Parse a stored JSON column, nulling the field on failure.
pub fn parse_json_field(document_id: &str, field: &str, raw: Option<&str>) -> Option<JsonValue> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                subsystem = "search",
                component = "formatter",
                document_id = %document_id,
                field = %field,
                error = %e,
                "Stored column is not valid JSON; returning null"
            );
            None
        }
    }
}

/// Convert one raw row into a typed search hit.
pub fn format_hit(row: RawSearchRow) -> SearchHit {
    let metadata = parse_json_field(&row.id, "metadata", row.metadata_raw.as_deref());

    SearchHit {
        tags: split_tags(row.tags_raw.as_deref().unwrap_or_default()),
        metadata,
        id: row.id,
        title: row.title,
        description: row.description,
        category: row.category,
        document_type: row.document_type,
        file_name: row.file_name,
        file_extension: row.file_extension,
        file_size: row.file_size,
        mime_type: row.mime_type,
        status: row.status,
        created_by: row.created_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
        stored_rank: row.stored_rank,
        engine_rank: row.engine_rank,
        combined_rank: row.combined_rank,
        snippet: row.snippet,
    }
}
