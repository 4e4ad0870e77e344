//! Progression state: cumulative training counters, the deload threshold,
//! and the per-run history log.
//!
//! The tracker fires at synthesis time, not at workout-completion time.
//! Re-synthesizing an already-scheduled month therefore counts its workouts
//! a second time. That is a known limitation carried over deliberately, not
//! a bug to fix here.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::schedule::DesiredEvent;

/// The externally persisted progression document. The core mutates a copy
/// and hands it back; writing it to disk is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionState {
    pub current_week: u32,
    pub workout_completion_count: CompletionCounts,
    pub deload_schedule: DeloadSchedule,
    #[serde(default)]
    pub ramping_exercises: BTreeMap<String, RampingExercise>,
    #[serde(default)]
    pub workout_states: BTreeMap<String, WorkoutState>,
    #[serde(default)]
    pub progression_history: ProgressionHistory,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

/// Monotonic completion counters: `total` plus one counter per workout
/// type, flattened alongside it in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionCounts {
    pub total: u32,
    #[serde(flatten)]
    pub per_type: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeloadSchedule {
    pub next_deload_at_workout_count: u32,
}

/// Fixed increment applied to the deload threshold when it is crossed.
const DELOAD_INTERVAL: u32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RampingExercise {
    pub current_ramp: Vec<u32>,
}

/// Per-exercise progression used when rendering event descriptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutState {
    pub exercises: BTreeMap<String, ExerciseState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseState {
    pub current_weight_lbs: u32,
    pub current_reps: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionHistory {
    #[serde(default)]
    pub changes: Vec<HistoryEntry>,
}

/// Immutable record of one synthesis run's effect on the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub old_week: u32,
    pub new_week: u32,
    pub weeks_scheduled: u32,
    pub full_workouts_added: u32,
    pub total_workout_count: u32,
}

impl ProgressionState {
    /// Whether the next synthesized month is a deload period.
    pub fn deload_due(&self) -> bool {
        self.workout_completion_count.total >= self.deload_schedule.next_deload_at_workout_count
    }

    /// Tally a synthesized month into the cumulative counters.
    ///
    /// Cardio-only sessions are excluded. The week counter advances by
    /// `max(1, full_workouts / 4)`. Crossing the deload threshold bumps it
    /// by exactly 8, once, no matter how far past it the total landed.
    pub fn apply_schedule(&mut self, events: &[DesiredEvent], today: NaiveDate) {
        let old_week = self.current_week;
        let old_total = self.workout_completion_count.total;

        let mut tallies: BTreeMap<&str, u32> = BTreeMap::new();
        for event in events {
            if let Some(tag) = event.workout_type() {
                *tallies.entry(tag).or_insert(0) += 1;
            }
        }
        let added: u32 = tallies.values().sum();

        for (tag, count) in &tallies {
            *self
                .workout_completion_count
                .per_type
                .entry((*tag).to_string())
                .or_insert(0) += count;
        }
        self.workout_completion_count.total = old_total + added;

        let weeks_scheduled = std::cmp::max(1, added / 4);
        self.current_week = old_week + weeks_scheduled;
        self.last_updated = Some(today);

        let next_deload = self.deload_schedule.next_deload_at_workout_count;
        if self.workout_completion_count.total >= next_deload {
            self.deload_schedule.next_deload_at_workout_count = next_deload + DELOAD_INTERVAL;
            info!(
                "deload threshold reached; next deload at workout count {}",
                next_deload + DELOAD_INTERVAL
            );
        }

        self.progression_history.changes.push(HistoryEntry {
            date: today,
            old_week,
            new_week: self.current_week,
            weeks_scheduled,
            full_workouts_added: added,
            total_workout_count: self.workout_completion_count.total,
        });

        info!(
            "progression updated: week {old_week} -> {}, total workouts {old_total} -> {}",
            self.current_week, self.workout_completion_count.total
        );
    }
}
