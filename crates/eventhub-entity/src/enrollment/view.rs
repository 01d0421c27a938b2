//! Read projections over the ledger joined with catalog and user data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eventhub_core::types::{EnrollmentId, EventId, ScheduleId, UserId};

/// One of a user's enrollments with the session and event it refers to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserEnrollmentView {
    /// Enrollment identifier.
    pub enrollment_id: EnrollmentId,
    /// Schedule identifier.
    pub schedule_id: ScheduleId,
    /// Event identifier.
    pub event_id: EventId,
    /// Event name.
    pub event_name: String,
    /// Event description.
    pub description: Option<String>,
    /// Event location.
    pub location: Option<String>,
    /// Event category.
    pub event_type: Option<String>,
    /// Event duration in minutes.
    pub duration: Option<i32>,
    /// Session start time.
    pub start_time: DateTime<Utc>,
    /// Session capacity.
    pub capacity: i32,
}

/// An enrolled user of one schedule, with profile fields for the roster.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleAttendeeView {
    /// Enrollment identifier.
    pub enrollment_id: EnrollmentId,
    /// User identifier.
    pub user_id: UserId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// School.
    pub school: Option<String>,
    /// School year.
    pub year: Option<String>,
    /// Course.
    pub course: Option<String>,
    /// When the seat was taken.
    pub enrolled_at: DateTime<Utc>,
}
