//! Background services for dossier-api.

pub mod analytics_writer;

pub use analytics_writer::AnalyticsWriter;
