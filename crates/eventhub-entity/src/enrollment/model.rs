//! Enrollment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eventhub_core::types::{EnrollmentId, ScheduleId, UserId};

/// A committed record binding one user to one scheduled session.
///
/// At most one row exists per `(user_id, schedule_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    /// Unique enrollment identifier.
    pub id: EnrollmentId,
    /// The enrolled user.
    pub user_id: UserId,
    /// The session the user holds a seat in.
    pub schedule_id: ScheduleId,
    /// When the seat was taken.
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    /// Build a new, not yet persisted enrollment.
    pub fn new(user_id: UserId, schedule_id: ScheduleId) -> Self {
        Self {
            id: EnrollmentId::new(),
            user_id,
            schedule_id,
            created_at: Utc::now(),
        }
    }

    /// Whether the given user owns this enrollment.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
