//! Extraction of class records from decoded plain-text message bodies.
//!
//! The mail collaborator hands over plain text (MIME/HTML decoding is its
//! job); this module pulls out the structured bits with regex tables. A
//! record that cannot be structurally extracted is a `Parse` failure the
//! drivers warn about and drop, never a reason to abort a batch.

use chrono::{Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{TraincalError, TraincalResult};
use crate::records::{CancellationRecord, ClassRecord};

/// Studio classes are a fixed 50 minutes; confirmations only carry a start.
const CLASS_DURATION_MINUTES: i64 = 50;

const CONFIRMATION_SUBJECT_KEYWORDS: &[&str] = &[
    "confirmed",
    "booking",
    "reservation",
    "class is booked",
    "see you in class",
    "you're booked",
];

const CANCELLATION_SUBJECT: &str = "Your class reservation has been canceled";

pub fn is_confirmation_subject(subject: &str) -> bool {
    let subject = subject.to_lowercase();
    CONFIRMATION_SUBJECT_KEYWORDS
        .iter()
        .any(|k| subject.contains(k))
}

pub fn is_cancellation_subject(subject: &str) -> bool {
    subject.contains(CANCELLATION_SUBJECT)
}

static MINDBODY_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Signature50:\s*(?:Full Body|Upper Body|Lower Body|Core & More))").unwrap()
});

static CLASS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(Foundations[:\s]*[A-Za-z\s]*)",
        r"(?i)(Full Body)",
        r"(?i)(Upper Body)",
        r"(?i)(Lower Body)",
        r"(?i)(Core & More)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// MindBody puts the time first: "8:00 AM, Sunday, 10/19/2025".
static MINDBODY_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2}:\d{2}\s*[AP]M),\s*([A-Za-z]+),\s*(\d{1,2}/\d{1,2}/\d{4})").unwrap()
});

static DATETIME_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // "Monday, January 15, 2024 at 6:00 PM"
        (
            r"(?i)([A-Za-z]+,\s+[A-Za-z]+\s+\d{1,2},\s+\d{4}\s+at\s+\d{1,2}:\d{2}\s*[AP]M)",
            "%A, %B %d, %Y at %I:%M %p",
        ),
        // "January 15, 2024 at 6:00 PM"
        (
            r"(?i)([A-Za-z]+\s+\d{1,2},\s+\d{4}\s+at\s+\d{1,2}:\d{2}\s*[AP]M)",
            "%B %d, %Y at %I:%M %p",
        ),
        // "Jan 15, 2024 6:00 PM"
        (
            r"(?i)([A-Za-z]+\s+\d{1,2},\s+\d{4}\s+\d{1,2}:\d{2}\s*[AP]M)",
            "%b %d, %Y %I:%M %p",
        ),
        // "1/15/2024 6:00 PM"
        (
            r"(?i)(\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}\s*[AP]M)",
            "%m/%d/%Y %I:%M %p",
        ),
    ]
    .iter()
    .map(|(p, f)| (Regex::new(p).unwrap(), *f))
    .collect()
});

static LOCATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // MindBody: the street address sits between the date and the door
        // code / "things to know" section.
        r"(?i)\d{1,2}/\d{1,2}/\d{4}([0-9A-Za-z\s,#]+?)(?:\s+[A-Z]+\s+DOOR CODE|DOOR CODE|things to know)",
        r"(?i)Studio[:\s]+([A-Za-z\s,]+?)(?:\n|<br>|\|)",
        r"(?i)Location[:\s]+([A-Za-z\s,]+?)(?:\n|<br>|\|)",
        r"(?i)([A-Za-z\s]+)\s+Studio",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// MindBody runs the instructor name straight into the class type, before
/// the time. Name casing is significant here, so no (?i).
static MINDBODY_INSTRUCTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:Full Body|Upper Body|Lower Body|Core & More)([A-Z][a-z]+\s+[A-Z][a-z]+)\s+\d{1,2}:\d{2}",
    )
    .unwrap()
});

static INSTRUCTOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Instructor[:\s]+([A-Za-z\s]+?)(?:\n|<br>|\|)",
        r"with\s+([A-Z][a-z]+\s+[A-Z][a-z]+)",
        r"(?i)Coach[:\s]+([A-Za-z\s]+?)(?:\n|<br>|\|)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DOOR_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)DOOR\s+CODE[:\s]+([0-9#]+)").unwrap());

static PARKING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(parking[:\s][^\n<]+)").unwrap());

/// "Your class reservation on 11/23/2025 at 10:00 AM under the blue lights
/// of [location] has been canceled."
static CANCEL_BLUE_LIGHTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Your class reservation on\s+(\d{1,2}/\d{1,2}/\d{4})\s+at\s+(\d{1,2}:\d{2}\s*[AP]M)\s+under the blue lights of\s+([^.]+)\s+has been canceled",
    )
    .unwrap()
});

/// "Your reservation on [date] at [time] for [location] has been canceled."
static CANCEL_PLAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Your reservation on\s+(\d{1,2}/\d{1,2}/\d{4})\s+at\s+(\d{1,2}:\d{2}\s*[AP]M)\s+for\s+([^.]+)\s+has been canceled",
    )
    .unwrap()
});

/// Extract a class confirmation from a decoded body. The start timestamp is
/// the one field that must be present; everything else has a fallback.
pub fn parse_confirmation(subject: &str, body: &str, tz: Tz) -> TraincalResult<ClassRecord> {
    let start = extract_datetime(body, tz).ok_or_else(|| {
        TraincalError::Parse("no date/time found in confirmation body".to_string())
    })?;
    let end = start + Duration::minutes(CLASS_DURATION_MINUTES);

    let title = extract_class_name(body, subject).unwrap_or_else(|| "Solidcore Class".to_string());
    let location = extract_location(body).unwrap_or_else(|| "Solidcore Studio".to_string());

    let mut description_parts = Vec::new();
    if let Some(instructor) = extract_instructor(body) {
        description_parts.push(format!("Instructor: {instructor}"));
    }
    let details = extract_details(body);
    if !details.is_empty() {
        description_parts.push(details);
    }
    description_parts.push("---\nAuto-created by traincal".to_string());

    Ok(ClassRecord {
        title,
        start,
        end,
        location,
        description: description_parts.join("\n"),
    })
}

/// Extract a cancellation notice. Both known body formats are tried.
pub fn parse_cancellation(body: &str, tz: Tz) -> TraincalResult<CancellationRecord> {
    let caps = CANCEL_BLUE_LIGHTS
        .captures(body)
        .or_else(|| CANCEL_PLAIN.captures(body))
        .ok_or_else(|| {
            TraincalError::Parse("no cancellation statement found in body".to_string())
        })?;

    let date = caps[1].to_string();
    let time = caps[2].to_string();
    let location = caps[3].trim().to_string();

    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%m/%d/%Y %I:%M %p")
        .map_err(|e| {
            TraincalError::Parse(format!("bad cancellation date/time '{date} {time}': {e}"))
        })?;
    let resolved = tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        TraincalError::Parse(format!("cancellation time {naive} does not exist in {tz}"))
    })?;

    Ok(CancellationRecord {
        date,
        time,
        location,
        resolved,
    })
}

fn extract_class_name(text: &str, subject: &str) -> Option<String> {
    if let Some(caps) = MINDBODY_CLASS.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    for re in CLASS_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            return Some(caps[1].trim().to_string());
        }
    }
    for re in CLASS_PATTERNS.iter() {
        if let Some(caps) = re.captures(subject) {
            return Some(caps[1].trim().to_string());
        }
    }
    None
}

fn extract_datetime(text: &str, tz: Tz) -> Option<chrono::DateTime<Tz>> {
    if let Some(caps) = MINDBODY_DATETIME.captures(text) {
        let composed = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
        if let Ok(naive) = NaiveDateTime::parse_from_str(&composed, "%I:%M %p %A %m/%d/%Y") {
            if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
                return Some(dt);
            }
        }
    }
    for (re, fmt) in DATETIME_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&caps[1], fmt) {
                if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
                    return Some(dt);
                }
            }
        }
    }
    None
}

fn extract_location(text: &str) -> Option<String> {
    for re in LOCATION_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            let location = collapse_whitespace(caps[1].trim());
            let location = location.trim_matches(|c| c == ',' || c == ' ');
            if !location.is_empty() {
                return Some(location.to_string());
            }
        }
    }
    None
}

fn extract_instructor(text: &str) -> Option<String> {
    if let Some(caps) = MINDBODY_INSTRUCTOR.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    for re in INSTRUCTOR_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            return Some(collapse_whitespace(caps[1].trim()));
        }
    }
    None
}

fn extract_details(text: &str) -> String {
    let mut details = Vec::new();
    if let Some(caps) = DOOR_CODE.captures(text) {
        details.push(format!("Door Code: {}", &caps[1]));
    }
    if let Some(caps) = PARKING.captures(text) {
        details.push(caps[1].trim().to_string());
    }
    details.join("\n")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
