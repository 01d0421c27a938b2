//! Schedule entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eventhub_core::types::{EventId, ScheduleId};

/// A time slot of an event with a fixed seat capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    /// Unique schedule identifier.
    pub id: ScheduleId,
    /// The event this session belongs to.
    pub event_id: EventId,
    /// When the session starts.
    pub start_time: DateTime<Utc>,
    /// Maximum number of enrollments (always positive).
    pub capacity: i32,
}

impl Schedule {
    /// Seats left given the current enrollment count, never negative.
    ///
    /// The count can exceed capacity only if capacity was lowered by the
    /// catalog after seats were taken.
    pub fn seats_left(&self, enrolled: i64) -> i64 {
        (i64::from(self.capacity) - enrolled).max(0)
    }

    /// Whether another enrollment would exceed capacity.
    pub fn is_full(&self, enrolled: i64) -> bool {
        enrolled >= i64::from(self.capacity)
    }
}

/// Schedule joined with its event name, for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleDetails {
    /// Schedule identifier.
    pub schedule_id: ScheduleId,
    /// Event identifier.
    pub event_id: EventId,
    /// Event name.
    pub event_name: String,
    /// Event location.
    pub location: Option<String>,
    /// Session start time.
    pub start_time: DateTime<Utc>,
    /// Session capacity.
    pub capacity: i32,
}

/// Seat accounting snapshot for one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    /// Schedule identifier.
    pub schedule_id: ScheduleId,
    /// Session capacity.
    pub capacity: i32,
    /// Current enrollment count.
    pub enrolled: i64,
    /// `capacity - enrolled`, floored at zero.
    pub available: i64,
}
