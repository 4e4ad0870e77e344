use anyhow::Result;
use log::info;
use owo_colors::OwoColorize;
use traincal_core::sync::ingest;

use crate::config::Config;
use crate::render::render_summary;
use crate::utils::tui::create_spinner;

pub async fn run(days: Option<i64>, dry_run: bool) -> Result<()> {
    let config = Config::load()?;
    let plan = config.load_plan()?;
    let calendar = config.calendar();
    let mailbox = config.mailbox();
    let queries = config.mail_queries();
    let days_back = days.unwrap_or(config.lookback_days);

    info!("class ingestion over the last {days_back} days (dry_run: {dry_run})");
    let spinner = create_spinner(format!("Searching the last {days_back} days of mail"));
    let outcome = ingest::run(
        &calendar,
        &mailbox,
        &plan.classifier,
        plan.timezone,
        &queries,
        days_back,
        dry_run,
    )
    .await?;
    spinner.finish_and_clear();

    println!(
        "Found {} confirmed classes and {} cancellations.\n",
        outcome.confirmations_found, outcome.cancellations_found
    );
    println!("{}", render_summary(&outcome.summary, dry_run));

    if dry_run {
        println!("\n{}", "Dry run: nothing was written.".yellow());
    }

    Ok(())
}
