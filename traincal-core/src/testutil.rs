//! Shared fixtures for unit tests: a sample plan matching the default
//! split, a blank progression state, and in-memory fake services.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;

use crate::classify::ClassifierRules;
use crate::error::{TraincalError, TraincalResult};
use crate::event::{CalendarEvent, EventTime, NewEvent};
use crate::plan::{
    CardioBlock, CardioSession, Cooldown, ExercisePlan, Warmup, WorkoutPlan, WorkoutTemplate,
};
use crate::progression::{
    CompletionCounts, DeloadSchedule, ProgressionState, RampingExercise,
};
use crate::remote::protocol::Message;
use crate::remote::{CalendarApi, MailApi};
use crate::schedule::{DesiredEvent, SessionKind};

fn template(name: &str, focus: &str, duration_minutes: i64) -> WorkoutTemplate {
    WorkoutTemplate {
        name: name.to_string(),
        focus: focus.to_string(),
        duration_minutes,
        warmup: Warmup {
            duration_minutes: 10,
            exercises: vec!["Band pull-aparts".to_string(), "Arm circles".to_string()],
        },
        main_exercises: vec![ExercisePlan {
            exercise: "Bench Press".to_string(),
            primary_equipment: "Barbell".to_string(),
            sets: 3,
            starting_weight_lbs: 95,
            rest_seconds: 90,
            notes: "Control the negative".to_string(),
        }],
        cardio: CardioBlock {
            kind: "Stairmaster".to_string(),
            duration_minutes: 25,
            intensity: "moderate".to_string(),
            notes: String::new(),
        },
        cooldown: Cooldown {
            duration_minutes: 5,
            notes: "Stretch".to_string(),
        },
    }
}

pub fn sample_plan() -> WorkoutPlan {
    let mut workouts = BTreeMap::new();
    workouts.insert("upper_push".to_string(), template("Upper Push", "Chest, shoulders, triceps", 85));
    workouts.insert(
        "lower_hamstring_posterior".to_string(),
        template("Lower Body - Hamstrings", "Hamstrings, glutes", 105),
    );
    workouts.insert("upper_pull".to_string(), template("Upper Pull", "Back, biceps", 85));
    workouts.insert(
        "lower_quad_glute".to_string(),
        template("Lower Body - Quads", "Quads, glutes", 105),
    );

    WorkoutPlan {
        timezone: New_York,
        rotation: vec![
            "upper_push".to_string(),
            "lower_hamstring_posterior".to_string(),
            "upper_pull".to_string(),
            "lower_quad_glute".to_string(),
        ],
        workouts,
        cardio_session: CardioSession {
            name: "Cardio Session - Post Class".to_string(),
            description: "Short cardio after class".to_string(),
            cardio: CardioBlock {
                kind: "Stairmaster".to_string(),
                duration_minutes: 25,
                intensity: "moderate".to_string(),
                notes: "Keep it easy".to_string(),
            },
        },
        classifier: ClassifierRules::default(),
        location: Some("Planet Fitness".to_string()),
    }
}

pub fn sample_state(total: u32, next_deload_at: u32) -> ProgressionState {
    let mut ramping = BTreeMap::new();
    ramping.insert(
        "squats".to_string(),
        RampingExercise {
            current_ramp: vec![30, 40, 55],
        },
    );
    ProgressionState {
        current_week: 0,
        workout_completion_count: CompletionCounts {
            total,
            per_type: BTreeMap::new(),
        },
        deload_schedule: DeloadSchedule {
            next_deload_at_workout_count: next_deload_at,
        },
        ramping_exercises: ramping,
        workout_states: BTreeMap::new(),
        progression_history: Default::default(),
        last_updated: None,
    }
}

pub fn full_workout_on(year: i32, month: u32, day: u32, workout_type: &str) -> DesiredEvent {
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    DesiredEvent {
        date,
        kind: SessionKind::Full {
            workout_type: workout_type.to_string(),
        },
        start: New_York
            .from_local_datetime(&date.and_hms_opt(7, 15, 0).unwrap())
            .unwrap(),
        duration_minutes: 85,
    }
}

pub fn timed_event(id: &str, summary: &str, start: DateTime<Utc>, minutes: i64) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        description: None,
        location: None,
        start: EventTime::DateTime(start),
        end: EventTime::DateTime(start + chrono::Duration::minutes(minutes)),
    }
}

/// In-memory calendar. Single-threaded like the drivers, so plain RefCell
/// interior mutability is enough.
#[derive(Default)]
pub struct FakeCalendar {
    pub events: RefCell<Vec<CalendarEvent>>,
    /// Event ids whose delete call should fail with a service error.
    pub failing_deletes: RefCell<Vec<String>>,
    pub deleted: RefCell<Vec<String>>,
    pub inserted: RefCell<Vec<NewEvent>>,
    next_id: Cell<u32>,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        FakeCalendar {
            events: RefCell::new(events),
            ..Default::default()
        }
    }

    pub fn summaries(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|e| e.summary.clone())
            .collect()
    }
}

impl CalendarApi for FakeCalendar {
    async fn list(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> TraincalResult<Vec<CalendarEvent>> {
        let mut events: Vec<_> = self
            .events
            .borrow()
            .iter()
            .filter(|e| {
                let start = e.start.to_utc();
                start >= time_min && start <= time_max
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start.to_utc());
        Ok(events)
    }

    async fn insert(&self, event: &NewEvent) -> TraincalResult<CalendarEvent> {
        let id = format!("evt-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let created = CalendarEvent {
            id,
            summary: event.summary.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            start: EventTime::DateTime(event.start),
            end: EventTime::DateTime(event.end),
        };
        self.inserted.borrow_mut().push(event.clone());
        self.events.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn delete(&self, event_id: &str) -> TraincalResult<()> {
        if self.failing_deletes.borrow().iter().any(|id| id == event_id) {
            return Err(TraincalError::Service("delete refused".to_string()));
        }
        let mut events = self.events.borrow_mut();
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(TraincalError::NotFound(event_id.to_string()));
        }
        self.deleted.borrow_mut().push(event_id.to_string());
        Ok(())
    }
}

/// In-memory mailbox keyed by subject search.
#[derive(Default)]
pub struct FakeMailbox {
    pub messages: Vec<Message>,
}

impl MailApi for FakeMailbox {
    async fn search(&self, query: &str) -> TraincalResult<Vec<String>> {
        // Match the subject fragment quoted in the query, the way the real
        // mail service would.
        let wanted = query
            .split("subject:\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap_or("");
        Ok(self
            .messages
            .iter()
            .filter(|m| m.subject.contains(wanted))
            .map(|m| m.id.clone())
            .collect())
    }

    async fn get(&self, message_id: &str) -> TraincalResult<Message> {
        self.messages
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
            .ok_or_else(|| TraincalError::NotFound(message_id.to_string()))
    }
}
