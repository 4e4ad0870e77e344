pub mod auth;
pub mod ingest;
pub mod schedule;
