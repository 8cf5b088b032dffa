//! Analytics event type and channel for decoupled search logging.
//!
//! Every executed search emits one [`SearchEvent`]. The search path never
//! writes analytics rows itself: events go onto an unbounded mpsc channel
//! consumed by a background writer task, so logging latency and failures
//! cannot affect search responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tracing::warn;

/// One executed search, as recorded for aggregate reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SearchEvent {
    /// The raw query text as searched.
    pub search_term: String,
    /// The filter map as a JSON object (empty object when unfiltered).
    pub filters: JsonValue,
    /// Authenticated user the search ran for, when known.
    pub user_id: Option<String>,
    /// Total matching rows (not the page size).
    pub result_count: i64,
    /// SQL execution time in milliseconds.
    pub search_time_ms: i64,
    /// When the search ran.
    pub occurred_at: DateTime<Utc>,
}

/// Receiving half of the analytics channel, held by the writer task.
pub type AnalyticsReceiver = mpsc::UnboundedReceiver<SearchEvent>;

/// Cloneable emitter handle for the analytics channel.
///
/// `emit` never blocks and never fails the caller: if the writer has shut
/// down, the event is dropped with a warning.
#[derive(Debug, Clone)]
pub struct AnalyticsBus {
    tx: mpsc::UnboundedSender<SearchEvent>,
}

impl AnalyticsBus {
    /// Create the bus and its receiver.
    pub fn channel() -> (Self, AnalyticsReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue an event for the writer task.
    pub fn emit(&self, event: SearchEvent) {
        if self.tx.send(event).is_err() {
            warn!(
                subsystem = "analytics",
                component = "bus",
                "Analytics writer is gone; search event dropped"
            );
        }
    }
}
