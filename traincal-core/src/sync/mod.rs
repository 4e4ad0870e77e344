//! Reconciliation drivers for the two sync modes.

pub mod ingest;
pub mod schedule_sync;
mod summary;

pub use summary::RunSummary;
