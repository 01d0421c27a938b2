//! Schedule repository: read access to the session catalog.

use sqlx::{PgConnection, PgPool};

use eventhub_core::error::{AppError, ErrorKind};
use eventhub_core::result::AppResult;
use eventhub_core::types::ScheduleId;
use eventhub_entity::schedule::{Schedule, ScheduleDetails};

/// Repository for catalog schedule lookups.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    /// Create a new schedule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a schedule by ID.
    pub async fn find_by_id(&self, id: ScheduleId) -> AppResult<Option<Schedule>> {
        sqlx::query_as::<_, Schedule>(
            "SELECT id, event_id, start_time, capacity FROM schedules WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find schedule", e))
    }

    /// Find a schedule joined with its event name and location.
    pub async fn find_details(&self, id: ScheduleId) -> AppResult<Option<ScheduleDetails>> {
        sqlx::query_as::<_, ScheduleDetails>(
            "SELECT s.id AS schedule_id, s.event_id, e.name AS event_name, e.location, \
                    s.start_time, s.capacity \
             FROM schedules s \
             JOIN events e ON e.id = s.event_id \
             WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find schedule details", e)
        })
    }

    /// Lock a schedule row for the rest of the enclosing transaction.
    ///
    /// Concurrent admissions to the same schedule queue on this lock, so
    /// the count that follows cannot be invalidated before commit.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        sqlx::query_as::<_, Schedule>(
            "SELECT id, event_id, start_time, capacity FROM schedules WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }
}
