//! The ordered output of a cohort simulation.

use std::fmt;

use serde::Serialize;

use crate::{
    event::{EventName, EventRecord},
    simulation::UserTimeline,
};

/// Counts describing a generated [`EventLog`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of simulated users
    pub users: u64,
    /// Number of users classified retained
    pub retained_users: u64,
    /// Total records in the log
    pub records: u64,
    /// Core events drawn past their user's last event date
    pub overflowed: u64,
    /// Records per event name, indexed by [`EventName::index`]
    pub per_event: [u64; EventName::ALL.len()],
}

impl Summary {
    fn observe(&mut self, timeline: &UserTimeline) {
        self.users += 1;
        if timeline.is_retained {
            self.retained_users += 1;
        }
        self.overflowed += u64::from(timeline.overflowed);
        for record in &timeline.events {
            self.records += 1;
            self.per_event[record.event_name.index()] += 1;
        }
    }

    /// Number of records carrying `event_name`.
    #[must_use]
    pub fn count(&self, event_name: EventName) -> u64 {
        self.per_event[event_name.index()]
    }

    /// Fraction of users classified retained.
    #[must_use]
    pub fn retained_fraction(&self) -> f64 {
        if self.users == 0 {
            0.0
        } else {
            self.retained_users as f64 / self.users as f64
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "users={} retained={} ({:.3}) records={} overflowed={}",
            self.users,
            self.retained_users,
            self.retained_fraction(),
            self.records,
            self.overflowed
        )?;
        for name in EventName::ALL {
            write!(f, " {name}={}", self.count(name))?;
        }
        Ok(())
    }
}

/// Event records sorted by `(user_id, timestamp)`
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    records: Vec<EventRecord>,
    summary: Summary,
}

impl EventLog {
    /// Merge per-user timelines into one log. Records are stably sorted by
    /// `user_id` as text and then by timestamp, so records sharing both keep
    /// their generation order.
    #[must_use]
    pub fn from_timelines(timelines: Vec<UserTimeline>) -> Self {
        let mut summary = Summary::default();
        let mut records = Vec::with_capacity(timelines.iter().map(|t| t.events.len()).sum());
        for timeline in timelines {
            summary.observe(&timeline);
            records.extend(timeline.events);
        }
        records.sort_by(EventRecord::output_order);
        Self { records, summary }
    }

    /// The sorted records.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Counts gathered while merging.
    #[must_use]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Consume the log, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }
}
