mod commands;
mod config;
mod render;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flexi_logger::{Duplicate, FileSpec, Logger};

#[derive(Parser)]
#[command(name = "traincal")]
#[command(about = "Synthesize monthly workout events and sync studio class bookings")]
struct Cli {
    /// Log and count every change without touching the calendar
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the workout schedule for one month
    Schedule {
        /// Month to synthesize (YYYY-MM)
        #[arg(short, long)]
        month: String,
    },
    /// Sync class confirmations and cancellations from booking mail
    Ingest {
        /// How many days of mail to search (defaults from config)
        #[arg(long)]
        days: Option<i64>,
    },
    Auth {
        provider: String, // e.g. "google"
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep the handle alive so the file writer flushes on exit.
    let _logger = init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Schedule { month } => {
            let (year, month) = parse_month(&month)?;
            commands::schedule::run(year, month, cli.dry_run).await
        }
        Commands::Ingest { days } => commands::ingest::run(days, cli.dry_run).await,
        Commands::Auth { provider } => commands::auth::run(&provider).await,
    }
}

fn init_logging() -> Result<flexi_logger::LoggerHandle> {
    Logger::try_with_env_or_str("info")
        .context("invalid RUST_LOG filter")?
        .log_to_file(FileSpec::default().basename("traincal"))
        .duplicate_to_stderr(Duplicate::Warn)
        .start()
        .context("failed to start logger")
}

fn parse_month(arg: &str) -> Result<(i32, u32)> {
    let (year, month) = arg
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("expected YYYY-MM, got '{arg}'"))?;
    let year: i32 = year.parse().context("invalid year")?;
    let month: u32 = month.parse().context("invalid month")?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("month must be 01-12, got {month:02}");
    }
    Ok((year, month))
}
