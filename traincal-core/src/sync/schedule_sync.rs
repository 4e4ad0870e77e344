//! Schedule-sync mode: destroy-and-recreate reconciliation of one month.
//!
//! The system-owned slice of the calendar is treated as a pure render
//! target: every managed event in the window is deleted, then the desired
//! state is synthesized from the rules and inserted fresh. Deletions run
//! strictly before creations. Class anchors are read-only throughout.

use chrono::{Duration, Utc};
use log::{info, warn};

use crate::classify::partition_events;
use crate::describe::{cardio_description, workout_description};
use crate::error::{TraincalError, TraincalResult};
use crate::event::NewEvent;
use crate::plan::WorkoutPlan;
use crate::progression::ProgressionState;
use crate::remote::CalendarApi;
use crate::schedule::{self, days_of_month, local, MonthSchedule, SessionKind};
use crate::sync::RunSummary;

/// Everything one schedule-sync run produces. The caller decides whether
/// to persist `state`; in dry-run mode it must not.
pub struct ScheduleOutcome {
    pub summary: RunSummary,
    pub schedule: MonthSchedule,
    pub state: ProgressionState,
}

pub async fn run<C: CalendarApi>(
    calendar: &C,
    plan: &WorkoutPlan,
    state: &ProgressionState,
    year: i32,
    month: u32,
    dry_run: bool,
) -> TraincalResult<ScheduleOutcome> {
    plan.validate()?;
    let tz = plan.timezone;
    let mut summary = RunSummary::default();

    let first = days_of_month(year, month)?
        .next()
        .ok_or_else(|| TraincalError::Config(format!("invalid month {year}-{month:02}")))?;
    let last = days_of_month(year, month)?.last().unwrap_or(first);
    let window_min = local(tz, first, 0, 0).with_timezone(&Utc);
    let window_max = (local(tz, last, 23, 59) + Duration::seconds(59)).with_timezone(&Utc);

    // Window fetch failures are run-scoped: nothing sensible can happen
    // without the current calendar contents.
    let existing = calendar.list(window_min, window_max).await?;
    let classified = partition_events(&existing, &plan.classifier, tz);
    info!(
        "month window {year}-{month:02}: {} events, {} anchors, {} system-owned",
        existing.len(),
        classified.anchors.len(),
        classified.system_owned.len()
    );

    for event in &classified.system_owned {
        if dry_run {
            summary.deleted += 1;
            continue;
        }
        match calendar.delete(&event.id).await {
            Ok(()) => summary.deleted += 1,
            Err(TraincalError::NotFound(_)) => summary.not_found += 1,
            Err(e) => {
                warn!("failed to delete '{}' ({}): {e}", event.summary, event.id);
                summary.errors += 1;
            }
        }
    }

    // The deload flag for descriptions is decided by the counters as they
    // stood before this run; applying the schedule can clear it.
    let deload = state.deload_due();

    let schedule = schedule::synthesize(year, month, &classified.anchors, plan, 0)?;
    let mut state = state.clone();
    let today = Utc::now().with_timezone(&tz).date_naive();
    state.apply_schedule(&schedule.events, today);

    for desired in &schedule.events {
        let (summary_text, description) = match &desired.kind {
            SessionKind::Full { workout_type } => {
                let template = plan.template(workout_type)?;
                (
                    template.name.clone(),
                    workout_description(workout_type, template, &state, deload),
                )
            }
            SessionKind::CardioOnly => (
                plan.cardio_session.name.clone(),
                cardio_description(&plan.cardio_session),
            ),
        };
        let start = desired.start.with_timezone(&Utc);
        let event = NewEvent {
            summary: summary_text,
            description: Some(description),
            location: plan.location.clone(),
            start,
            end: start + Duration::minutes(desired.duration_minutes),
        };

        if dry_run {
            summary.created += 1;
            continue;
        }
        match calendar.insert(&event).await {
            Ok(created) => {
                info!("created '{}' on {}", created.summary, desired.date);
                summary.created += 1;
            }
            Err(e) => {
                warn!("failed to create '{}' on {}: {e}", event.summary, desired.date);
                summary.errors += 1;
            }
        }
    }

    Ok(ScheduleOutcome {
        summary,
        schedule,
        state,
    })
}
