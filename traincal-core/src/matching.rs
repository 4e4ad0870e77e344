//! Identity resolution: deciding, under timing tolerance and text
//! similarity, whether two independently sourced event descriptors denote
//! the same real-world occurrence.
//!
//! Two independently parameterized modes share one primitive, the token
//! overlap ratio. Dedup mode answers "is this confirmation already on the
//! calendar" (first match wins); cancellation-lookup mode returns every
//! event a cancellation refers to, since each is removed independently.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::debug;

use crate::classify::ClassifierRules;
use crate::event::CalendarEvent;
use crate::records::{CancellationRecord, ClassRecord};

const DEDUP_TIME_TOLERANCE_SECS: i64 = 60;
const CANCEL_TIME_TOLERANCE_SECS: i64 = 120;
const TITLE_OVERLAP_THRESHOLD: f64 = 0.70;
const LOCATION_OVERLAP_THRESHOLD: f64 = 0.50;

const TITLE_STOPWORDS: &[&str] = &["at", "with", "w/", "the", "a", "an", "in", "on", "class"];
const LOCATION_STOPWORDS: &[&str] = &[
    "at", "the", "a", "an", "in", "on", "studio", "location", "class",
];

/// `|intersection| / min(|a|, |b|)` over lowercased whitespace tokens with
/// the stopwords removed. `None` when either side has no tokens left, which
/// callers treat as "the ratio check fails".
pub fn token_overlap(a: &str, b: &str, stopwords: &[&str]) -> Option<f64> {
    let tokenize = |s: &str| -> HashSet<String> {
        s.to_lowercase()
            .split_whitespace()
            .filter(|t| !stopwords.contains(t))
            .map(str::to_string)
            .collect()
    };
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return None;
    }
    let overlap = tokens_a.intersection(&tokens_b).count() as f64;
    let min_len = tokens_a.len().min(tokens_b.len()) as f64;
    Some(overlap / min_len)
}

/// Dedup mode: does a confirmed class already exist on the calendar?
///
/// A pair matches iff the starts are within a minute AND the titles agree:
/// either verbatim (lowercased, trimmed), or both carry a class keyword and
/// their token overlap reaches 0.70.
pub fn is_duplicate(
    record: &ClassRecord,
    existing: &[CalendarEvent],
    rules: &ClassifierRules,
) -> bool {
    let record_title = record.title.trim().to_lowercase();
    let record_start: DateTime<Utc> = record.start.with_timezone(&Utc);

    for event in existing {
        let delta = (record_start - event.start.to_utc()).num_seconds().abs();
        if delta >= DEDUP_TIME_TOLERANCE_SECS {
            continue;
        }

        let event_title = event.summary.trim().to_lowercase();
        let titles_match = record_title == event_title
            || (rules.title_has_anchor_keyword(&record_title)
                && rules.title_has_anchor_keyword(&event_title)
                && token_overlap(&record_title, &event_title, TITLE_STOPWORDS)
                    .is_some_and(|ratio| ratio >= TITLE_OVERLAP_THRESHOLD));

        if titles_match {
            debug!(
                "duplicate: '{}' matches '{}' (start delta {delta}s)",
                record.title, event.summary
            );
            return true;
        }
    }
    false
}

/// Cancellation-lookup mode: every calendar event a cancellation refers to.
///
/// A pair matches iff the starts are within two minutes AND the locations
/// agree: one contains the other, or their token overlap reaches 0.50.
/// When stopword removal empties a side, only exact location equality
/// counts. An empty result is "not found", never an error.
pub fn find_cancelled<'a>(
    cancellation: &CancellationRecord,
    events: &'a [CalendarEvent],
) -> Vec<&'a CalendarEvent> {
    let cancel_start = cancellation.resolved.with_timezone(&Utc);
    let cancel_location = cancellation.location.trim().to_lowercase();

    let mut matches = Vec::new();
    for event in events {
        let delta = (cancel_start - event.start.to_utc()).num_seconds().abs();
        if delta >= CANCEL_TIME_TOLERANCE_SECS {
            continue;
        }

        let event_location = event
            .location
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let containment = !event_location.is_empty()
            && (event_location.contains(&cancel_location)
                || cancel_location.contains(&event_location));
        let similar = match token_overlap(&cancel_location, &event_location, LOCATION_STOPWORDS) {
            Some(ratio) => ratio >= LOCATION_OVERLAP_THRESHOLD,
            None => cancel_location == event_location,
        };

        if containment || similar {
            debug!(
                "cancellation match: '{}' at {} (delta {delta}s)",
                event.summary, cancellation.location
            );
            matches.push(event);
        }
    }
    matches
}
