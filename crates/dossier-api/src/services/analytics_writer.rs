//! Background analytics writer.
//!
//! Drains the analytics channel into the database so the search path never
//! waits on a log write. A failed insert is logged and dropped; the writer
//! keeps running. The task ends when every sender is gone.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use dossier_core::{AnalyticsReceiver, AnalyticsStore};

/// Consumes search events and writes them to an [`AnalyticsStore`].
pub struct AnalyticsWriter<A> {
    store: A,
    rx: AnalyticsReceiver,
}

impl<A: AnalyticsStore + 'static> AnalyticsWriter<A> {
    /// Create a writer over the given store and receiver.
    pub fn new(store: A, rx: AnalyticsReceiver) -> Self {
        Self { store, rx }
    }

    /// Spawn the writer loop on the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!(
            subsystem = "analytics",
            component = "analytics_writer",
            "Analytics writer started"
        );

        while let Some(event) = self.rx.recv().await {
            match self.store.record(&event).await {
                Ok(()) => {
                    debug!(
                        subsystem = "analytics",
                        component = "analytics_writer",
                        op = "record",
                        query = %event.search_term,
                        result_count = event.result_count,
                        "Search event recorded"
                    );
                }
                Err(e) => {
                    warn!(
                        subsystem = "analytics",
                        component = "analytics_writer",
                        error = %e,
                        "Failed to record search event; dropping it"
                    );
                }
            }
        }

        info!(
            subsystem = "analytics",
            component = "analytics_writer",
            "Analytics writer stopped"
        );
    }
}
