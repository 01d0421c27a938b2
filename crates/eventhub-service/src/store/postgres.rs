//! PostgreSQL-backed catalog and ledger.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use eventhub_core::error::{AppError, ErrorKind};
use eventhub_core::result::AppResult;
use eventhub_core::types::{EnrollmentId, EventId, ScheduleId, UserId};
use eventhub_database::repositories::{EnrollmentRepository, ScheduleRepository};
use eventhub_database::{DatabasePool, LedgerFault, classify};
use eventhub_entity::enrollment::{Enrollment, ScheduleAttendeeView, UserEnrollmentView};
use eventhub_entity::schedule::{Schedule, ScheduleDetails};

use super::{AdmissionTx, EnrollmentStore};
use crate::catalog::SessionCatalog;
use crate::error::EnrollmentError;

/// Catalog and ledger over one PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgEnrollmentStore {
    /// Connection pool.
    db: DatabasePool,
    /// Schedule lookups.
    schedules: ScheduleRepository,
    /// Ledger reads and cancellations.
    enrollments: EnrollmentRepository,
}

impl PgEnrollmentStore {
    /// Create a store over an established pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            schedules: ScheduleRepository::new(pool.clone()),
            enrollments: EnrollmentRepository::new(pool),
            db,
        }
    }

    fn pool(&self) -> &PgPool {
        self.db.pool()
    }
}

#[async_trait]
impl SessionCatalog for PgEnrollmentStore {
    async fn get_schedule(&self, id: ScheduleId) -> AppResult<Option<Schedule>> {
        self.schedules.find_by_id(id).await
    }

    async fn schedule_details(&self, id: ScheduleId) -> AppResult<Option<ScheduleDetails>> {
        self.schedules.find_details(id).await
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn begin(&self, lock_timeout: Duration) -> Result<Box<dyn AdmissionTx>, EnrollmentError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| ledger_error(e, "Failed to begin transaction"))?;

        let millis = u64::try_from(lock_timeout.as_millis()).unwrap_or(u64::MAX);
        EnrollmentRepository::set_lock_timeout(&mut *tx, millis)
            .await
            .map_err(|e| ledger_error(e, "Failed to set lock timeout"))?;

        Ok(Box::new(PgAdmissionTx { tx }))
    }

    async fn find_enrollment(&self, id: EnrollmentId) -> AppResult<Option<Enrollment>> {
        self.enrollments.find_by_id(id).await
    }

    async fn count_for_schedule(&self, schedule_id: ScheduleId) -> AppResult<i64> {
        self.enrollments.count(schedule_id).await
    }

    async fn delete_for_user(&self, user_id: UserId, schedule_id: ScheduleId) -> AppResult<u64> {
        self.enrollments.delete_for_user(user_id, schedule_id).await
    }

    async fn delete_by_id_for_user(&self, id: EnrollmentId, user_id: UserId) -> AppResult<u64> {
        self.enrollments.delete_by_id_for_user(id, user_id).await
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserEnrollmentView>> {
        self.enrollments.list_for_user(user_id).await
    }

    async fn list_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> AppResult<Vec<ScheduleAttendeeView>> {
        self.enrollments.list_for_schedule(schedule_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}

/// One admission transaction. Dropping it rolls back.
struct PgAdmissionTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AdmissionTx for PgAdmissionTx {
    async fn lock_user(&mut self, user_id: UserId) -> Result<(), EnrollmentError> {
        EnrollmentRepository::lock_user(&mut *self.tx, user_id)
            .await
            .map_err(|e| ledger_error(e, "Failed to lock user"))
    }

    async fn lock_schedule(
        &mut self,
        schedule_id: ScheduleId,
    ) -> Result<Option<Schedule>, EnrollmentError> {
        ScheduleRepository::lock_for_update(&mut *self.tx, schedule_id)
            .await
            .map_err(|e| ledger_error(e, "Failed to lock schedule"))
    }

    async fn has_time_conflict(
        &mut self,
        user_id: UserId,
        schedule: &Schedule,
        same_event: Option<EventId>,
    ) -> Result<bool, EnrollmentError> {
        EnrollmentRepository::has_time_conflict(
            &mut *self.tx,
            user_id,
            schedule.id,
            schedule.start_time,
            same_event,
        )
        .await
        .map_err(|e| ledger_error(e, "Failed to check time conflicts"))
    }

    async fn has_enrollment(
        &mut self,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<bool, EnrollmentError> {
        EnrollmentRepository::exists(&mut *self.tx, user_id, schedule_id)
            .await
            .map_err(|e| ledger_error(e, "Failed to check enrollment"))
    }

    async fn count_enrollments(&mut self, schedule_id: ScheduleId) -> Result<i64, EnrollmentError> {
        EnrollmentRepository::count_for_schedule(&mut *self.tx, schedule_id)
            .await
            .map_err(|e| ledger_error(e, "Failed to count enrollments"))
    }

    async fn insert(&mut self, enrollment: Enrollment) -> Result<Enrollment, EnrollmentError> {
        EnrollmentRepository::insert(&mut *self.tx, &enrollment)
            .await
            .map_err(|e| ledger_error(e, "Failed to insert enrollment"))
    }

    async fn commit(self: Box<Self>) -> Result<(), EnrollmentError> {
        self.tx
            .commit()
            .await
            .map_err(|e| ledger_error(e, "Failed to commit enrollment"))
    }
}

/// Map a statement failure inside an admission unit to its outcome.
fn ledger_error(err: sqlx::Error, context: &'static str) -> EnrollmentError {
    match classify(&err) {
        LedgerFault::Contention => {
            debug!(error = %err, context, "Ledger contention");
            EnrollmentError::TransientConflict
        }
        LedgerFault::UniqueViolation => EnrollmentError::DuplicateEnrollment,
        LedgerFault::Other => {
            EnrollmentError::Store(AppError::with_source(ErrorKind::Database, context, err))
        }
    }
}
