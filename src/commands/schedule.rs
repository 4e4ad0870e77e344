use anyhow::Result;
use log::info;
use owo_colors::OwoColorize;
use traincal_core::sync::schedule_sync;

use crate::config::Config;
use crate::render::render_summary;
use crate::utils::tui::create_spinner;

pub async fn run(year: i32, month: u32, dry_run: bool) -> Result<()> {
    let config = Config::load()?;
    let plan = config.load_plan()?;
    let state = config.load_state()?;
    let calendar = config.calendar();

    info!("schedule sync for {year}-{month:02} (dry_run: {dry_run})");
    let spinner = create_spinner(format!("Syncing schedule for {year}-{month:02}"));
    let outcome = schedule_sync::run(&calendar, &plan, &state, year, month, dry_run).await?;
    spinner.finish_and_clear();

    println!(
        "Schedule for {year}-{month:02}: {} full workouts, {} cardio sessions\n",
        outcome.schedule.events.iter().filter(|e| e.is_full()).count(),
        outcome
            .schedule
            .events
            .iter()
            .filter(|e| !e.is_full())
            .count()
    );
    println!("{}", render_summary(&outcome.summary, dry_run));

    if dry_run {
        println!("\n{}", "Dry run: nothing was written.".yellow());
    } else {
        config.save_state(&outcome.state)?;
        println!(
            "\nProgression saved: week {}, {} total workouts.",
            outcome.state.current_week, outcome.state.workout_completion_count.total
        );
    }

    Ok(())
}
