//! Table-driven event classification.
//!
//! Partitions fetched calendar events into class anchors (externally
//! scheduled studio classes the synthesis rules key off), system-owned
//! events (previously synthesized, fully regenerable) and everything else.
//! Classification is pure string matching against keyword tables, so it is
//! unit-testable without touching the network.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, EventTime};

/// Keyword tables driving the classifier. Lives in the workout plan
/// document so new class names don't require a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    pub anchor_keywords: Vec<String>,
    pub managed_keywords: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        ClassifierRules {
            anchor_keywords: ["solidcore", "signature50", "focus50", "advanced65"]
                .map(String::from)
                .to_vec(),
            managed_keywords: ["cardio session", "upper push", "upper pull", "lower body"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Anchor,
    SystemOwned,
    Other,
}

impl ClassifierRules {
    /// Classify an event title. Managed keywords win over anchor keywords
    /// so our own synthesized events never register as class anchors.
    pub fn classify(&self, title: &str) -> EventClass {
        let title = title.to_lowercase();
        if self.managed_keywords.iter().any(|k| title.contains(k.as_str())) {
            return EventClass::SystemOwned;
        }
        if self.anchor_keywords.iter().any(|k| title.contains(k.as_str())) {
            return EventClass::Anchor;
        }
        EventClass::Other
    }

    pub fn title_has_anchor_keyword(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.anchor_keywords.iter().any(|k| title.contains(k.as_str()))
    }
}

/// The one externally scheduled class on a given date.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorEvent {
    pub date: NaiveDate,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub is_afternoon: bool,
}

/// Per-date anchor map. Invariant: at most one anchor per date; the first
/// classified occurrence wins and later ones on the same date are discarded.
pub type AnchorSchedule = BTreeMap<NaiveDate, AnchorEvent>;

/// Fetched events split by classification.
pub struct ClassifiedEvents {
    pub anchors: AnchorSchedule,
    pub system_owned: Vec<CalendarEvent>,
}

pub fn partition_events(
    events: &[CalendarEvent],
    rules: &ClassifierRules,
    tz: Tz,
) -> ClassifiedEvents {
    let mut anchors = AnchorSchedule::new();
    let mut system_owned = Vec::new();

    for event in events {
        match rules.classify(&event.summary) {
            EventClass::SystemOwned => system_owned.push(event.clone()),
            EventClass::Anchor => {
                // All-day entries carry no usable end time to schedule off.
                let (EventTime::DateTime(start), EventTime::DateTime(end)) =
                    (&event.start, &event.end)
                else {
                    debug!("skipping all-day class entry: {}", event.summary);
                    continue;
                };
                let start = start.with_timezone(&tz);
                let end = end.with_timezone(&tz);
                let date = start.date_naive();

                if anchors.contains_key(&date) {
                    debug!("discarding second class on {date}: {}", event.summary);
                    continue;
                }
                let is_afternoon = start.hour() >= 12;
                info!(
                    "class anchor found: {date} at {} (afternoon: {is_afternoon})",
                    start.format("%H:%M")
                );
                anchors.insert(
                    date,
                    AnchorEvent {
                        date,
                        start,
                        end,
                        is_afternoon,
                    },
                );
            }
            EventClass::Other => {}
        }
    }

    info!(
        "classified {} events: {} anchors, {} system-owned",
        events.len(),
        anchors.len(),
        system_owned.len()
    );
    ClassifiedEvents {
        anchors,
        system_owned,
    }
}
