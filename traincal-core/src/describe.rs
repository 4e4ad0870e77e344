//! Renders event descriptions for synthesized sessions.
//!
//! Descriptions are plain multiline text: section headers, numbered
//! exercises with the current weights and reps from the progression
//! state, and warmup/cardio/cooldown blocks.

use crate::plan::{CardioSession, WorkoutTemplate};
use crate::progression::ProgressionState;

/// Weight multiplier applied during a deload period.
const DELOAD_FACTOR: f64 = 0.8;

/// Reps assumed for an exercise with no tracked state yet.
const FALLBACK_REPS: u32 = 12;

/// Description for a standalone cardio session.
pub fn cardio_description(session: &CardioSession) -> String {
    let cardio = &session.cardio;
    let lines = [
        session.name.to_uppercase(),
        String::new(),
        session.description.clone(),
        String::new(),
        "CARDIO:".to_string(),
        format!("{} - {} minutes", cardio.kind, cardio.duration_minutes),
        format!("Intensity: {}", cardio.intensity),
        String::new(),
        format!("Note: {}", cardio.notes),
    ];
    lines.join("\n")
}

/// Description for a full workout.
///
/// `deload` is the flag captured before the progression counters were
/// advanced for this run; updating the counters can clear the deload
/// condition mid-run otherwise.
pub fn workout_description(
    workout_type: &str,
    template: &WorkoutTemplate,
    state: &ProgressionState,
    deload: bool,
) -> String {
    let mut lines = vec![
        template.name.to_uppercase(),
        format!("Focus: {}", template.focus),
        String::new(),
    ];

    if deload {
        lines.push("DELOAD WEEK - Reduce weights by 20%".to_string());
        lines.push(String::new());
    }

    lines.push(format!("WARMUP ({} min):", template.warmup.duration_minutes));
    for exercise in &template.warmup.exercises {
        lines.push(format!("- {exercise}"));
    }
    lines.push(String::new());

    lines.push("MAIN WORKOUT:".to_string());
    lines.push(String::new());

    let exercise_states = state
        .workout_states
        .get(workout_type)
        .map(|w| &w.exercises);

    for (i, plan) in template.main_exercises.iter().enumerate() {
        let number = i + 1;
        let tracked = exercise_states.and_then(|exercises| {
            let wanted = normalize(&plan.exercise);
            exercises
                .iter()
                .find(|(key, _)| key.contains(&wanted))
                .map(|(_, s)| s)
        });

        // Ramping exercises render one weight per set.
        if plan.exercise.to_lowercase() == "squats" {
            if let (Some(tracked), Some(ramp)) =
                (tracked, state.ramping_exercises.get("squats"))
            {
                if ramp.current_ramp.len() >= 3 {
                    let weights: Vec<u32> = ramp
                        .current_ramp
                        .iter()
                        .map(|w| apply_deload(*w, deload))
                        .collect();
                    lines.push(format!("{number}. {} ({})", plan.exercise, plan.primary_equipment));
                    for (set, weight) in weights.iter().enumerate() {
                        lines.push(format!(
                            "   Set {}: {} reps @ {} lbs",
                            set + 1,
                            tracked.current_reps,
                            weight
                        ));
                    }
                    lines.push(format!("   Rest: {}s", plan.rest_seconds));
                    lines.push(format!("   > {}", plan.notes));
                    lines.push(String::new());
                    continue;
                }
            }
        }

        let (weight, reps) = match tracked {
            Some(s) => (apply_deload(s.current_weight_lbs, deload), s.current_reps),
            None => (plan.starting_weight_lbs, FALLBACK_REPS),
        };

        lines.push(format!("{number}. {} ({})", plan.exercise, plan.primary_equipment));
        lines.push(format!(
            "   {} sets x {} reps @ {} lbs | Rest: {}s",
            plan.sets, reps, weight, plan.rest_seconds
        ));
        lines.push(format!("   > {}", plan.notes));
        lines.push(String::new());
    }

    lines.push("CARDIO:".to_string());
    lines.push(format!(
        "{} - {} minutes ({})",
        template.cardio.kind, template.cardio.duration_minutes, template.cardio.intensity
    ));
    lines.push(String::new());

    lines.push(format!(
        "COOLDOWN ({} min):",
        template.cooldown.duration_minutes
    ));
    lines.push(template.cooldown.notes.clone());

    lines.join("\n")
}

fn apply_deload(weight: u32, deload: bool) -> u32 {
    if deload {
        (weight as f64 * DELOAD_FACTOR) as u32
    } else {
        weight
    }
}

/// Exercise names are matched against state keys after lowercasing and
/// mapping spaces and hyphens to underscores.
fn normalize(name: &str) -> String {
    name.to_lowercase().replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{ExerciseState, WorkoutState};
    use crate::testutil::{sample_plan, sample_state};

    #[test]
    fn untracked_exercise_falls_back_to_starting_weight() {
        let plan = sample_plan();
        let state = sample_state(0, 8);
        let template = plan.template("upper_push").unwrap();

        let text = workout_description("upper_push", template, &state, false);

        assert!(text.contains("UPPER PUSH"));
        assert!(text.contains("3 sets x 12 reps @ 95 lbs | Rest: 90s"));
        assert!(!text.contains("DELOAD"));
    }

    #[test]
    fn tracked_exercise_uses_current_weight_and_deload_scales_it() {
        let plan = sample_plan();
        let mut state = sample_state(8, 8);
        let mut workout_state = WorkoutState::default();
        workout_state.exercises.insert(
            "bench_press_barbell".to_string(),
            ExerciseState {
                current_weight_lbs: 135,
                current_reps: 8,
            },
        );
        state
            .workout_states
            .insert("upper_push".to_string(), workout_state);
        let template = plan.template("upper_push").unwrap();

        let text = workout_description("upper_push", template, &state, true);

        assert!(text.contains("DELOAD WEEK - Reduce weights by 20%"));
        // 135 * 0.8 = 108
        assert!(text.contains("3 sets x 8 reps @ 108 lbs"));
    }

    #[test]
    fn ramping_exercise_renders_one_weight_per_set() {
        let mut plan = sample_plan();
        let state = {
            let mut state = sample_state(0, 8);
            let mut workout_state = WorkoutState::default();
            workout_state.exercises.insert(
                "squats_barbell".to_string(),
                ExerciseState {
                    current_weight_lbs: 55,
                    current_reps: 10,
                },
            );
            state
                .workout_states
                .insert("lower_quad_glute".to_string(), workout_state);
            state
        };
        let template = plan.workouts.get_mut("lower_quad_glute").unwrap();
        template.main_exercises[0].exercise = "Squats".to_string();

        let text = workout_description("lower_quad_glute", template, &state, false);

        assert!(text.contains("Set 1: 10 reps @ 30 lbs"));
        assert!(text.contains("Set 2: 10 reps @ 40 lbs"));
        assert!(text.contains("Set 3: 10 reps @ 55 lbs"));
    }

    #[test]
    fn cardio_description_names_the_session() {
        let plan = sample_plan();
        let text = cardio_description(&plan.cardio_session);

        assert!(text.contains("CARDIO SESSION - POST CLASS"));
        assert!(text.contains("Stairmaster - 25 minutes"));
        assert!(text.contains("Intensity: moderate"));
    }
}
