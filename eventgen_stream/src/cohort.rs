//! Cohort configuration.
//!
//! Every knob of the simulation lives here. Defaults reproduce the reference
//! cohort: 5,000 users, 30% retained, a 14 day activation window and a 180
//! day generation span starting 2025-01-01.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, macros::date};

use crate::{Error, common::config::ConfRange};

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Minutes in a day. Golden path delays must stay below this.
pub(crate) const MINUTES_PER_DAY: u32 = 24 * 60;

/// What to do with a core event whose jittered timestamp lands after the
/// user's last event date.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Keep the event as drawn. It is at most one day late.
    #[default]
    Allow,
    /// Move the event back to the last event date.
    Clamp,
    /// Discard the event.
    Drop,
}

/// Configure a cohort of simulated users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of users to simulate
    pub users: u32,
    /// Probability that a user is retained
    pub retention_probability: f64,
    /// Days after sign-up during which the golden path bias applies
    pub activation_window_days: u32,
    /// Per-session probability that a retained user in the activation window
    /// walks the golden path
    pub activation_probability: f64,
    /// Per-session, per-event probability of emitting each core event
    pub core_event_probability: f64,
    /// Boundary separating churned from retained lifespans
    pub retention_cutoff_days: u32,
    /// Bound on sign-up offsets and lifespans
    pub generation_span_days: u32,
    /// Base date for all offsets
    #[serde(with = "date_format")]
    pub epoch_start: Date,
    /// Sign-up day, as an offset from `epoch_start`
    pub sign_up_offset_days: ConfRange<u32>,
    /// Lifespan of a retained user
    pub retained_duration_days: ConfRange<u32>,
    /// Lifespan of a churned user
    pub churned_duration_days: ConfRange<u32>,
    /// Delay from session start to `task_assigned`
    pub task_assigned_minutes: ConfRange<u32>,
    /// Delay from session start to `slack_integration_used`
    pub slack_integration_minutes: ConfRange<u32>,
    /// Whole days between sessions. A uniform fraction of a day is added on
    /// top.
    pub session_gap_days: ConfRange<u32>,
    /// Treatment of core events jittered past the last event date
    pub overflow: Overflow,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            users: 5_000,
            retention_probability: 0.30,
            activation_window_days: 14,
            activation_probability: 0.80,
            core_event_probability: 0.50,
            retention_cutoff_days: 90,
            generation_span_days: 180,
            epoch_start: date!(2025-01-01),
            sign_up_offset_days: ConfRange::Inclusive { min: 0, max: 179 },
            retained_duration_days: ConfRange::Inclusive { min: 100, max: 179 },
            churned_duration_days: ConfRange::Inclusive { min: 3, max: 59 },
            task_assigned_minutes: ConfRange::Inclusive { min: 10, max: 59 },
            slack_integration_minutes: ConfRange::Inclusive { min: 61, max: 119 },
            session_gap_days: ConfRange::Inclusive { min: 1, max: 2 },
            overflow: Overflow::Allow,
        }
    }
}

fn probability(name: &str, value: f64) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "`{name}` must be within [0, 1], got {value}"
        )))
    }
}

fn range(name: &str, value: &ConfRange<u32>) -> Result<(), Error> {
    let (valid, reason) = value.valid();
    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!("`{name}` is invalid: {reason}")))
    }
}

impl Config {
    /// Determine whether the configuration admits a simulation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.users == 0 {
            return Err(Error::Validation(
                "`users` must be greater than zero".to_string(),
            ));
        }

        probability("retention_probability", self.retention_probability)?;
        probability("activation_probability", self.activation_probability)?;
        probability("core_event_probability", self.core_event_probability)?;

        range("sign_up_offset_days", &self.sign_up_offset_days)?;
        range("retained_duration_days", &self.retained_duration_days)?;
        range("churned_duration_days", &self.churned_duration_days)?;
        range("task_assigned_minutes", &self.task_assigned_minutes)?;
        range("slack_integration_minutes", &self.slack_integration_minutes)?;
        range("session_gap_days", &self.session_gap_days)?;

        if self.sign_up_offset_days.end() >= self.generation_span_days {
            return Err(Error::Validation(format!(
                "`sign_up_offset_days` must stay below the generation span of {} days, got {}",
                self.generation_span_days, self.sign_up_offset_days
            )));
        }
        if self.retained_duration_days.end() >= self.generation_span_days {
            return Err(Error::Validation(format!(
                "`retained_duration_days` must stay below the generation span of {} days, got {}",
                self.generation_span_days, self.retained_duration_days
            )));
        }
        if self.retained_duration_days.start() <= self.retention_cutoff_days {
            return Err(Error::Validation(format!(
                "`retained_duration_days` must exceed the retention cutoff of {} days, got {}",
                self.retention_cutoff_days, self.retained_duration_days
            )));
        }
        if self.churned_duration_days.end() >= self.retention_cutoff_days {
            return Err(Error::Validation(format!(
                "`churned_duration_days` must stay below the retention cutoff of {} days, got {}",
                self.retention_cutoff_days, self.churned_duration_days
            )));
        }
        // Golden path events must land inside the retained lifespan.
        if self.activation_window_days >= self.retained_duration_days.start() {
            return Err(Error::Validation(format!(
                "`activation_window_days` must be shorter than the shortest retained lifespan, got {} >= {}",
                self.activation_window_days,
                self.retained_duration_days.start()
            )));
        }
        if self.task_assigned_minutes.end() >= self.slack_integration_minutes.start() {
            return Err(Error::Validation(format!(
                "`task_assigned_minutes` ({}) must end before `slack_integration_minutes` ({}) begins",
                self.task_assigned_minutes, self.slack_integration_minutes
            )));
        }
        if self.slack_integration_minutes.end() >= MINUTES_PER_DAY {
            return Err(Error::Validation(format!(
                "`slack_integration_minutes` must stay below one day, got {}",
                self.slack_integration_minutes
            )));
        }
        if self.session_gap_days.start() == 0 {
            return Err(Error::Validation(
                "`session_gap_days` must be at least one day".to_string(),
            ));
        }

        if self.epoch_start.checked_add(self.horizon()).is_none() {
            return Err(Error::Validation(format!(
                "`epoch_start` {} plus a {} day horizon overflows the calendar",
                self.epoch_start,
                self.horizon().whole_days()
            )));
        }

        Ok(())
    }

    /// Furthest any cursor or timestamp can travel past `epoch_start`.
    fn horizon(&self) -> Duration {
        let lifespan = self
            .retained_duration_days
            .end()
            .max(self.churned_duration_days.end());
        let days = i64::from(self.sign_up_offset_days.end())
            + i64::from(lifespan)
            + i64::from(self.session_gap_days.end())
            + 2;
        Duration::days(days)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_invalid(config: &Config, needle: &str) {
        match config.validate() {
            Err(Error::Validation(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {msg}");
            }
            other => panic!("expected validation failure mentioning {needle}, got {other:?}"),
        }
    }

    #[test]
    fn default_is_valid() {
        Config::default().validate().expect("default config is valid");
    }

    #[test]
    fn zero_users_rejected() {
        let config = Config {
            users: 0,
            ..Config::default()
        };
        assert_invalid(&config, "users");
    }

    #[test]
    fn probabilities_outside_unit_interval_rejected() {
        let config = Config {
            retention_probability: 1.5,
            ..Config::default()
        };
        assert_invalid(&config, "retention_probability");

        let config = Config {
            core_event_probability: f64::NAN,
            ..Config::default()
        };
        assert_invalid(&config, "core_event_probability");
    }

    #[test]
    fn inverted_duration_rejected() {
        let config = Config {
            churned_duration_days: ConfRange::Inclusive { min: 59, max: 3 },
            ..Config::default()
        };
        assert_invalid(&config, "churned_duration_days");
    }

    #[test]
    fn lifespans_must_straddle_cutoff() {
        let config = Config {
            retained_duration_days: ConfRange::Inclusive { min: 80, max: 179 },
            ..Config::default()
        };
        assert_invalid(&config, "retention cutoff");

        let config = Config {
            churned_duration_days: ConfRange::Inclusive { min: 3, max: 95 },
            ..Config::default()
        };
        assert_invalid(&config, "retention cutoff");
    }

    #[test]
    fn sign_up_must_stay_within_span() {
        let config = Config {
            sign_up_offset_days: ConfRange::Inclusive { min: 0, max: 180 },
            ..Config::default()
        };
        assert_invalid(&config, "generation span");
    }

    #[test]
    fn golden_path_must_be_ordered() {
        let config = Config {
            task_assigned_minutes: ConfRange::Inclusive { min: 10, max: 70 },
            ..Config::default()
        };
        assert_invalid(&config, "task_assigned_minutes");
    }

    #[test]
    fn session_gap_must_advance() {
        let config = Config {
            session_gap_days: ConfRange::Inclusive { min: 0, max: 2 },
            ..Config::default()
        };
        assert_invalid(&config, "session_gap_days");
    }

    #[test]
    fn calendar_overflow_rejected() {
        let config = Config {
            epoch_start: Date::MAX,
            ..Config::default()
        };
        assert_invalid(&config, "overflows");
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"users": 12, "epoch_start": "2024-06-30", "overflow": "drop"}"#,
        )
        .expect("parse");
        assert_eq!(config.users, 12);
        assert_eq!(config.epoch_start, date!(2024-06-30));
        assert_eq!(config.overflow, Overflow::Drop);
        assert_eq!(config.retention_cutoff_days, 90);
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"user_count": 12}"#);
        assert!(result.is_err());
    }
}
