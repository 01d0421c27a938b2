//! Enrollment ledger repository.
//!
//! Pool-level methods run at the default isolation level and serve
//! cancellation and read paths. The associated functions taking a
//! `&mut PgConnection` are the admission steps; they run inside a caller's
//! transaction and return raw `sqlx::Error` so the caller can classify it.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use eventhub_core::error::{AppError, ErrorKind};
use eventhub_core::result::AppResult;
use eventhub_core::types::{EnrollmentId, EventId, ScheduleId, UserId};
use eventhub_entity::enrollment::{Enrollment, ScheduleAttendeeView, UserEnrollmentView};

/// Repository for the enrollment ledger.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an enrollment by ID.
    pub async fn find_by_id(&self, id: EnrollmentId) -> AppResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT id, user_id, schedule_id, created_at FROM enrollments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find enrollment", e))
    }

    /// Current number of enrollments in a schedule, outside any admission unit.
    pub async fn count(&self, schedule_id: ScheduleId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE schedule_id = $1")
            .bind(schedule_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count enrollments", e))
    }

    /// Delete the enrollment of `user_id` in `schedule_id`. Returns rows removed.
    pub async fn delete_for_user(&self, user_id: UserId, schedule_id: ScheduleId) -> AppResult<u64> {
        sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND schedule_id = $2")
            .bind(user_id)
            .bind(schedule_id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete enrollment", e))
    }

    /// Delete an enrollment by ID, only if it belongs to `user_id`. Returns rows removed.
    pub async fn delete_by_id_for_user(&self, id: EnrollmentId, user_id: UserId) -> AppResult<u64> {
        sqlx::query("DELETE FROM enrollments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete enrollment", e))
    }

    /// A user's enrollments with session and event data, earliest session first.
    pub async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserEnrollmentView>> {
        sqlx::query_as::<_, UserEnrollmentView>(
            "SELECT en.id AS enrollment_id, s.id AS schedule_id, ev.id AS event_id, \
                    ev.name AS event_name, ev.description, ev.location, \
                    ev.type AS event_type, ev.duration, s.start_time, s.capacity \
             FROM enrollments en \
             JOIN schedules s ON s.id = en.schedule_id \
             JOIN events ev ON ev.id = s.event_id \
             WHERE en.user_id = $1 \
             ORDER BY s.start_time ASC, en.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list user enrollments", e)
        })
    }

    /// Attendee roster of a schedule in enrollment order.
    pub async fn list_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> AppResult<Vec<ScheduleAttendeeView>> {
        sqlx::query_as::<_, ScheduleAttendeeView>(
            "SELECT en.id AS enrollment_id, u.id AS user_id, u.first_name, u.last_name, \
                    u.email, u.school, u.year, u.course, en.created_at AS enrolled_at \
             FROM enrollments en \
             JOIN users u ON u.id = en.user_id \
             WHERE en.schedule_id = $1 \
             ORDER BY en.created_at ASC",
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list schedule enrollments", e)
        })
    }

    /// Bound every lock wait in the current transaction.
    pub async fn set_lock_timeout(conn: &mut PgConnection, millis: u64) -> Result<(), sqlx::Error> {
        // SET does not accept bind parameters; `millis` is an integer.
        let statement = format!("SET LOCAL lock_timeout = '{millis}ms'");
        sqlx::query(&statement)
            .execute(conn)
            .await
            .map(|_| ())
    }

    /// Serialize admissions of one user for the rest of the transaction.
    ///
    /// Schedule row locks alone do not cover two simultaneous enrollments
    /// of the same user into different schedules at the same time slot.
    pub async fn lock_user(conn: &mut PgConnection, user_id: UserId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(user_lock_key(user_id))
            .execute(conn)
            .await
            .map(|_| ())
    }

    /// Whether the user holds a seat in another schedule starting at `start_time`.
    ///
    /// When `same_event` is set only schedules of that event are considered.
    pub async fn has_time_conflict(
        conn: &mut PgConnection,
        user_id: UserId,
        schedule_id: ScheduleId,
        start_time: DateTime<Utc>,
        same_event: Option<EventId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM enrollments en \
                JOIN schedules s ON s.id = en.schedule_id \
                WHERE en.user_id = $1 \
                  AND s.start_time = $2 \
                  AND en.schedule_id <> $3 \
                  AND ($4::uuid IS NULL OR s.event_id = $4) \
             )",
        )
        .bind(user_id)
        .bind(start_time)
        .bind(schedule_id)
        .bind(same_event)
        .fetch_one(conn)
        .await
    }

    /// Whether the user already holds a seat in this exact schedule.
    pub async fn exists(
        conn: &mut PgConnection,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND schedule_id = $2)",
        )
        .bind(user_id)
        .bind(schedule_id)
        .fetch_one(conn)
        .await
    }

    /// Current number of enrollments in a schedule.
    pub async fn count_for_schedule(
        conn: &mut PgConnection,
        schedule_id: ScheduleId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE schedule_id = $1")
            .bind(schedule_id)
            .fetch_one(conn)
            .await
    }

    /// Insert a new enrollment row.
    pub async fn insert(
        conn: &mut PgConnection,
        enrollment: &Enrollment,
    ) -> Result<Enrollment, sqlx::Error> {
        sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (id, user_id, schedule_id, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, schedule_id, created_at",
        )
        .bind(enrollment.id)
        .bind(enrollment.user_id)
        .bind(enrollment.schedule_id)
        .bind(enrollment.created_at)
        .fetch_one(conn)
        .await
    }
}

/// Advisory lock key for a user: the two halves of the UUID folded together.
///
/// Distinct users may share a key; that only serializes them needlessly.
fn user_lock_key(user_id: UserId) -> i64 {
    let (high, low) = user_id.into_uuid().as_u64_pair();
    (high ^ low) as i64
}
