//! Core types and sync logic for the traincal ecosystem.
//!
//! This crate provides everything the CLI binary composes:
//! - `event`, `records` for calendar events and parsed mail records
//! - `classify`, `schedule`, `progression`, `describe` for the monthly
//!   rule-driven schedule synthesis
//! - `parse`, `matching` for mail extraction and identity resolution
//! - `remote` for the provider subprocess protocol and service traits
//! - `sync` for the two reconciliation drivers

pub mod classify;
pub mod describe;
pub mod error;
pub mod event;
pub mod matching;
pub mod parse;
pub mod plan;
pub mod progression;
pub mod records;
pub mod remote;
pub mod schedule;
pub mod sync;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{TraincalError, TraincalResult};
