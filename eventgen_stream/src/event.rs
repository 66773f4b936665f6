//! Event records and the vocabulary of event names.
//!
//! An [`EventRecord`] is the unit of output: who did what, and when. Records
//! are never mutated once the simulation has produced them.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{
    PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

/// Text layout of every timestamp written out. Fixed width, so lexicographic
/// order agrees with chronological order.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");

time::serde::format_description!(timestamp_format, PrimitiveDateTime, TIMESTAMP_FORMAT);

/// Prefix of every generated user identifier.
pub const USER_ID_PREFIX: &str = "user_";

/// Render the identifier of the user at 1-based `index`.
#[must_use]
pub fn user_id(index: u32) -> String {
    format!("{USER_ID_PREFIX}{index}")
}

/// The event vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    /// A session began. Emitted once per session, and sometimes as noise.
    AppSessionStart,
    /// The user created a project.
    ProjectCreated,
    /// The user posted a daily status update.
    DailyStatusUpdate,
    /// First step of the golden path.
    TaskAssigned,
    /// Second step of the golden path.
    SlackIntegrationUsed,
}

impl EventName {
    /// Every event name, in a stable order.
    pub const ALL: [EventName; 5] = [
        EventName::AppSessionStart,
        EventName::ProjectCreated,
        EventName::DailyStatusUpdate,
        EventName::TaskAssigned,
        EventName::SlackIntegrationUsed,
    ];

    /// Core features, each independently rolled once per session.
    pub const CORE: [EventName; 3] = [
        EventName::AppSessionStart,
        EventName::ProjectCreated,
        EventName::DailyStatusUpdate,
    ];

    /// The golden path, in the order it is performed.
    pub const GOLDEN_PATH: [EventName; 2] =
        [EventName::TaskAssigned, EventName::SlackIntegrationUsed];

    /// The label written to the output artifact.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventName::AppSessionStart => "app_session_start",
            EventName::ProjectCreated => "project_created",
            EventName::DailyStatusUpdate => "daily_status_update",
            EventName::TaskAssigned => "task_assigned",
            EventName::SlackIntegrationUsed => "slack_integration_used",
        }
    }

    /// Position of this name in [`EventName::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (user, timestamp, event) row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Owning user, `user_<index>`
    pub user_id: String,
    /// When the event happened, microsecond resolution
    #[serde(with = "timestamp_format")]
    pub timestamp: PrimitiveDateTime,
    /// What happened
    pub event_name: EventName,
}

impl EventRecord {
    /// Ordering used for the output artifact: by `user_id` as text, then by
    /// time.
    #[must_use]
    pub fn output_order(&self, other: &Self) -> std::cmp::Ordering {
        self.user_id
            .cmp(&other.user_id)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
    }
}
