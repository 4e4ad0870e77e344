//! Parsed confirmation and cancellation records from the mail collaborator.

use chrono::DateTime;
use chrono_tz::Tz;

/// A parsed class-confirmation record, consumed once by the identity
/// resolver in dedup mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: String,
    pub description: String,
}

/// A parsed cancellation notice. `resolved` is the absolute timestamp the
/// date and time strings combine to; only it is used for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct CancellationRecord {
    pub date: String,
    pub time: String,
    pub location: String,
    pub resolved: DateTime<Tz>,
}
