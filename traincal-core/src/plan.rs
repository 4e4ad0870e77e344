//! The static workout plan document.
//!
//! Holds the rotation order, per-workout-type templates with their
//! durations, the cardio-only session, and the classifier keyword tables.
//! Loaded and persisted by the CLI; the core only sees the parsed shape.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::classify::ClassifierRules;
use crate::error::{TraincalError, TraincalResult};

fn default_timezone() -> Tz {
    chrono_tz::America::New_York
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Timezone the scheduling rules are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Round-robin cycle of workout-type tags. Must be non-empty.
    pub rotation: Vec<String>,
    /// Per-workout-type templates, keyed by rotation tag.
    pub workouts: BTreeMap<String, WorkoutTemplate>,
    /// The short session that follows a class anchor.
    pub cardio_session: CardioSession,
    #[serde(default)]
    pub classifier: ClassifierRules,
    /// Location put on synthesized events (e.g. the gym).
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    /// Event title, e.g. "Upper Push".
    pub name: String,
    pub focus: String,
    pub duration_minutes: i64,
    pub warmup: Warmup,
    pub main_exercises: Vec<ExercisePlan>,
    pub cardio: CardioBlock,
    pub cooldown: Cooldown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warmup {
    pub duration_minutes: i64,
    pub exercises: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub exercise: String,
    pub primary_equipment: String,
    pub sets: u32,
    pub starting_weight_lbs: u32,
    pub rest_seconds: u32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardioBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub duration_minutes: i64,
    pub intensity: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cooldown {
    pub duration_minutes: i64,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardioSession {
    /// Event title, e.g. "Cardio Session - Post Class".
    pub name: String,
    pub description: String,
    pub cardio: CardioBlock,
}

impl WorkoutPlan {
    /// Validate the plan before a run. An empty rotation or a rotation tag
    /// without a template aborts the whole run.
    pub fn validate(&self) -> TraincalResult<()> {
        if self.rotation.is_empty() {
            return Err(TraincalError::Config("workout rotation is empty".into()));
        }
        for tag in &self.rotation {
            if !self.workouts.contains_key(tag) {
                return Err(TraincalError::Config(format!(
                    "rotation references unknown workout type '{tag}'"
                )));
            }
        }
        Ok(())
    }

    pub fn template(&self, tag: &str) -> TraincalResult<&WorkoutTemplate> {
        self.workouts.get(tag).ok_or_else(|| {
            TraincalError::Config(format!("no template for workout type '{tag}'"))
        })
    }
}
