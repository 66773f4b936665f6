//! Per-user lifecycle simulation.
//!
//! A user signs up on some day after the epoch, is classified retained or
//! churned, and then opens sessions every one to three days until their last
//! event date. Every session emits an `app_session_start`, rolls for each core
//! event, and, for retained users still inside the activation window, rolls
//! for the golden path.
//!
//! Users never share state. Each one draws from its own sub-stream seeded
//! from the caller's generator in user-index order, so the cohort is
//! reproducible from a single seed.

use rand::{Rng, SeedableRng, rngs::StdRng};
use time::{Duration, PrimitiveDateTime, Time};
use tracing::{debug, trace};

use crate::{
    Error, Generator,
    cohort::{Config, Overflow},
    event::{EventName, EventRecord, user_id},
    event_log::EventLog,
};

const MICROSECONDS_PER_DAY: i64 = 86_400_000_000;

/// The simulated lifecycle of one user
#[derive(Debug, Clone, PartialEq)]
pub struct UserTimeline {
    /// Identifier shared by every record of this user
    pub user_id: String,
    /// Whether the user outlives the retention cutoff
    pub is_retained: bool,
    /// Midnight of the sign-up day
    pub sign_up: PrimitiveDateTime,
    /// Sign-up plus the drawn lifespan
    pub last_event: PrimitiveDateTime,
    /// Core events whose jittered timestamp was drawn past `last_event`,
    /// counted before the overflow policy applies
    pub overflowed: u32,
    /// Emitted records, in generation order
    pub events: Vec<EventRecord>,
}

impl UserTimeline {
    fn emit(&mut self, event_name: EventName, timestamp: PrimitiveDateTime) {
        self.events.push(EventRecord {
            user_id: self.user_id.clone(),
            timestamp,
            event_name,
        });
    }
}

/// A validated cohort, ready to be simulated
#[derive(Debug, Clone)]
pub struct Cohort {
    config: Config,
}

impl Cohort {
    /// Create a new [`Cohort`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the configuration does not admit a
    /// simulation. See [`Config::validate`].
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this cohort was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Simulate every user in index order, each from its own sub-stream of
    /// `rng`.
    pub fn simulate_users<R>(&self, rng: &mut R) -> Vec<UserTimeline>
    where
        R: Rng + ?Sized,
    {
        (1..=self.config.users)
            .map(|index| {
                let mut user_rng = StdRng::from_seed(rng.random());
                self.simulate_user(index, &mut user_rng)
            })
            .collect()
    }

    /// Simulate the user at 1-based `index`, drawing only from `rng`.
    pub fn simulate_user<R>(&self, index: u32, rng: &mut R) -> UserTimeline
    where
        R: Rng + ?Sized,
    {
        let config = &self.config;

        let is_retained = rng.random_bool(config.retention_probability);
        let sign_up_offset = config.sign_up_offset_days.sample(rng);
        let sign_up = PrimitiveDateTime::new(config.epoch_start, Time::MIDNIGHT)
            + Duration::days(i64::from(sign_up_offset));
        let lifespan = if is_retained {
            config.retained_duration_days.sample(rng)
        } else {
            config.churned_duration_days.sample(rng)
        };
        let last_event = sign_up + Duration::days(i64::from(lifespan));
        let activation_window = Duration::days(i64::from(config.activation_window_days));

        let mut timeline = UserTimeline {
            user_id: user_id(index),
            is_retained,
            sign_up,
            last_event,
            overflowed: 0,
            events: Vec::new(),
        };

        let mut current = sign_up;
        while current <= last_event {
            timeline.emit(EventName::AppSessionStart, current);

            if is_retained
                && current - sign_up < activation_window
                && rng.random_bool(config.activation_probability)
            {
                let task_assigned = current + minutes(config.task_assigned_minutes.sample(rng));
                let slack_integration =
                    current + minutes(config.slack_integration_minutes.sample(rng));
                timeline.emit(EventName::TaskAssigned, task_assigned);
                timeline.emit(EventName::SlackIntegrationUsed, slack_integration);
            }

            for event_name in EventName::CORE {
                if !rng.random_bool(config.core_event_probability) {
                    continue;
                }
                let timestamp = current + fraction_of_day(rng);
                if timestamp <= last_event {
                    timeline.emit(event_name, timestamp);
                    continue;
                }
                timeline.overflowed += 1;
                match config.overflow {
                    Overflow::Allow => timeline.emit(event_name, timestamp),
                    Overflow::Clamp => timeline.emit(event_name, last_event),
                    Overflow::Drop => {}
                }
            }

            current += Duration::days(i64::from(config.session_gap_days.sample(rng)))
                + fraction_of_day(rng);
        }

        trace!(
            user_id = %timeline.user_id,
            is_retained,
            sign_up = %timeline.sign_up,
            last_event = %timeline.last_event,
            events = timeline.events.len(),
            "simulated user"
        );
        timeline
    }
}

impl<'a> Generator<'a> for Cohort {
    type Output = EventLog;
    type Error = Error;

    fn generate<R>(&'a self, rng: &mut R) -> Result<Self::Output, Self::Error>
    where
        R: Rng + ?Sized,
    {
        let timelines = self.simulate_users(rng);
        let log = EventLog::from_timelines(timelines);
        debug!(
            users = log.summary().users,
            records = log.summary().records,
            "cohort generated"
        );
        Ok(log)
    }
}

fn minutes(value: u32) -> Duration {
    Duration::minutes(i64::from(value))
}

/// Uniform in `[0, 1)` days at microsecond resolution.
fn fraction_of_day<R>(rng: &mut R) -> Duration
where
    R: Rng + ?Sized,
{
    Duration::microseconds(rng.random_range(0..MICROSECONDS_PER_DAY))
}
