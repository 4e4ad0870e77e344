//! App configuration: provider names, document paths and mail queries.
//!
//! Lives at `<config dir>/traincal/config.toml`, overridable with the
//! `TRAINCAL_CONFIG` environment variable. The workout plan and
//! progression state are separate JSON documents referenced by path.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use traincal_core::plan::WorkoutPlan;
use traincal_core::progression::ProgressionState;
use traincal_core::remote::provider::Provider;
use traincal_core::remote::{RemoteCalendar, RemoteMailbox};
use traincal_core::sync::ingest::MailQueries;

pub const CONFIG_ENV_VAR: &str = "TRAINCAL_CONFIG";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub calendar_provider: String,
    pub mail_provider: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    pub plan_path: PathBuf,
    pub state_path: PathBuf,
    /// Mail search overrides; the defaults pin the MindBody sender and
    /// subject lines.
    pub confirmation_query: Option<String>,
    pub cancellation_query: Option<String>,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_lookback_days() -> i64 {
    30
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }
        let base = dirs::config_dir().context("could not determine the user config directory")?;
        Ok(base.join("traincal").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("could not read config at {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config at {}", path.display()))
    }

    pub fn load_plan(&self) -> Result<WorkoutPlan> {
        let raw = fs::read_to_string(&self.plan_path)
            .with_context(|| format!("could not read plan at {}", self.plan_path.display()))?;
        let plan: WorkoutPlan = serde_json::from_str(&raw)
            .with_context(|| format!("invalid plan at {}", self.plan_path.display()))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn load_state(&self) -> Result<ProgressionState> {
        let raw = fs::read_to_string(&self.state_path).with_context(|| {
            format!(
                "could not read progression state at {}",
                self.state_path.display()
            )
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!(
                "invalid progression state at {}",
                self.state_path.display()
            )
        })
    }

    pub fn save_state(&self, state: &ProgressionState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.state_path, json).with_context(|| {
            format!(
                "could not write progression state to {}",
                self.state_path.display()
            )
        })
    }

    pub fn calendar(&self) -> RemoteCalendar {
        RemoteCalendar::new(
            Provider::from_name(&self.calendar_provider),
            self.calendar_id.clone(),
        )
    }

    pub fn mailbox(&self) -> RemoteMailbox {
        RemoteMailbox::new(Provider::from_name(&self.mail_provider))
    }

    pub fn mail_queries(&self) -> MailQueries {
        let defaults = MailQueries::default();
        MailQueries {
            confirmations: self
                .confirmation_query
                .clone()
                .unwrap_or(defaults.confirmations),
            cancellations: self
                .cancellation_query
                .clone()
                .unwrap_or(defaults.cancellations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("progression_state.json");
        let config = Config {
            calendar_provider: "google".to_string(),
            mail_provider: "gmail".to_string(),
            calendar_id: default_calendar_id(),
            plan_path: dir.path().join("workout_plan.json"),
            state_path: state_path.clone(),
            confirmation_query: None,
            cancellation_query: None,
            lookback_days: 30,
        };

        let mut state: ProgressionState =
            serde_json::from_str(include_str!("../progression_state.example.json")).unwrap();
        state.current_week = 4;
        config.save_state(&state).unwrap();

        let loaded = config.load_state().unwrap();
        assert_eq!(loaded.current_week, 4);
        assert_eq!(loaded.deload_schedule.next_deload_at_workout_count, 8);
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
            calendar_provider = "google"
            mail_provider = "gmail"
            plan_path = "/home/me/.config/traincal/workout_plan.json"
            state_path = "/home/me/.config/traincal/progression_state.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.lookback_days, 30);
        assert!(config
            .mail_queries()
            .confirmations
            .contains("mindbodyonline.com"));
    }
}
