//! Desired-state synthesis.
//!
//! A deterministic rule table maps every calendar day of a month to zero or
//! one workout event, keyed on the weekday bucket and whether a class
//! anchor exists that day. Only full workouts advance the rotation;
//! cardio-only sessions after a class never do.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Weekday};
use chrono_tz::Tz;
use log::info;

use crate::classify::{AnchorSchedule, AnchorEvent};
use crate::error::{TraincalError, TraincalResult};
use crate::plan::WorkoutPlan;

/// Minutes between the end of a class and the session that follows it.
const POST_CLASS_BUFFER_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKind {
    /// A complete session; advances rotation and progression counters.
    Full { workout_type: String },
    /// A short cardio block after a class; never advances the rotation.
    CardioOnly,
}

/// A rule-synthesized event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredEvent {
    pub date: NaiveDate,
    pub kind: SessionKind,
    pub start: DateTime<Tz>,
    pub duration_minutes: i64,
}

impl DesiredEvent {
    pub fn is_full(&self) -> bool {
        matches!(self.kind, SessionKind::Full { .. })
    }

    pub fn workout_type(&self) -> Option<&str> {
        match &self.kind {
            SessionKind::Full { workout_type } => Some(workout_type),
            SessionKind::CardioOnly => None,
        }
    }
}

/// One month of synthesized events, ordered by date, plus the rotation
/// offset to continue from. The offset is explicit per-run state: it is
/// handed in, handed back, and deliberately not persisted across runs.
#[derive(Debug)]
pub struct MonthSchedule {
    pub events: Vec<DesiredEvent>,
    pub next_rotation_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayBucket {
    MonFri,
    Midweek,
    Weekend,
}

fn bucket(weekday: Weekday) -> DayBucket {
    match weekday {
        Weekday::Mon | Weekday::Fri => DayBucket::MonFri,
        Weekday::Tue | Weekday::Wed | Weekday::Thu => DayBucket::Midweek,
        Weekday::Sat | Weekday::Sun => DayBucket::Weekend,
    }
}

enum Decision {
    /// Full workout at a start time; the bool requests the Mon/Fri
    /// duration-based morning override.
    Full(DateTime<Tz>, bool),
    Cardio(DateTime<Tz>),
}

pub fn synthesize(
    year: i32,
    month: u32,
    anchors: &AnchorSchedule,
    plan: &WorkoutPlan,
    rotation_offset: usize,
) -> TraincalResult<MonthSchedule> {
    plan.validate()?;
    let tz = plan.timezone;
    let mut offset = rotation_offset;
    let mut events = Vec::new();

    for date in days_of_month(year, month)? {
        let anchor = anchors.get(&date);
        let decision = match (bucket(date.weekday()), anchor) {
            (DayBucket::MonFri, Some(a)) => Decision::Cardio(after_class(a)),
            (DayBucket::MonFri, None) => Decision::Full(local(tz, date, 7, 15), true),
            (DayBucket::Midweek, Some(a)) => Decision::Cardio(after_class(a)),
            (DayBucket::Midweek, None) => Decision::Full(local(tz, date, 20, 0), false),
            (DayBucket::Weekend, Some(a)) => Decision::Full(after_class(a), false),
            (DayBucket::Weekend, None) => Decision::Full(local(tz, date, 15, 0), false),
        };

        match decision {
            Decision::Full(mut start, morning_override) => {
                let workout_type = plan.rotation[offset % plan.rotation.len()].clone();
                let duration_minutes = plan.template(&workout_type)?.duration_minutes;
                if morning_override {
                    // Longer lower-body sessions start earlier to finish by 9.
                    start = if duration_minutes == 105 {
                        local(tz, date, 7, 15)
                    } else {
                        local(tz, date, 7, 30)
                    };
                }
                info!(
                    "scheduled full workout: {workout_type} on {date} at {} ({duration_minutes} min)",
                    start.format("%H:%M")
                );
                events.push(DesiredEvent {
                    date,
                    kind: SessionKind::Full { workout_type },
                    start,
                    duration_minutes,
                });
                offset += 1;
            }
            Decision::Cardio(start) => {
                let duration_minutes = plan.cardio_session.cardio.duration_minutes;
                info!(
                    "scheduled cardio-only session on {date} at {} ({duration_minutes} min)",
                    start.format("%H:%M")
                );
                events.push(DesiredEvent {
                    date,
                    kind: SessionKind::CardioOnly,
                    start,
                    duration_minutes,
                });
            }
        }
    }

    let full = events.iter().filter(|e| e.is_full()).count();
    info!(
        "synthesized {year}-{month:02}: {full} full workouts + {} cardio sessions",
        events.len() - full
    );
    Ok(MonthSchedule {
        events,
        next_rotation_offset: offset,
    })
}

fn after_class(anchor: &AnchorEvent) -> DateTime<Tz> {
    anchor.end + Duration::minutes(POST_CLASS_BUFFER_MINUTES)
}

/// Scheduled times never land inside a DST gap, so earliest() resolves.
pub(crate) fn local(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Tz> {
    tz.from_local_datetime(&date.and_hms_opt(hour, minute, 0).unwrap())
        .earliest()
        .unwrap()
}

pub(crate) fn days_of_month(
    year: i32,
    month: u32,
) -> TraincalResult<impl Iterator<Item = NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TraincalError::Config(format!("invalid month {year}-{month:02}")))?;
    Ok(std::iter::successors(Some(first), move |d| {
        d.succ_opt().filter(|n| n.month() == month)
    }))
}
