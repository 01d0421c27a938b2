//! Admission engine: grants or denies a seat in a schedule.

use std::sync::Arc;

use tracing::{error, info, warn};

use eventhub_core::config::{AdmissionConfig, TimeConflictScope};
use eventhub_core::types::{ScheduleId, UserId};
use eventhub_entity::enrollment::Enrollment;

use crate::error::EnrollmentError;
use crate::store::{AdmissionTx, EnrollmentStore};

/// Decides enrollment requests against the ledger.
///
/// Every attempt runs as one admission unit: lock the user, lock the
/// schedule, check time conflict, duplicate and capacity in that order,
/// insert, commit. Contention aborts the unit and the whole attempt is
/// retried up to `max_attempts` times.
#[derive(Debug, Clone)]
pub struct AdmissionEngine {
    /// Ledger store.
    store: Arc<dyn EnrollmentStore>,
    /// Retry and policy settings.
    config: AdmissionConfig,
}

impl AdmissionEngine {
    /// Creates a new admission engine.
    pub fn new(store: Arc<dyn EnrollmentStore>, config: AdmissionConfig) -> Self {
        Self { store, config }
    }

    /// Enroll a user into a schedule.
    pub async fn enroll(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<Enrollment, EnrollmentError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.attempt(user_id, schedule_id).await {
                Ok(enrollment) => {
                    info!(
                        user_id = %user_id,
                        schedule_id = %schedule_id,
                        enrollment_id = %enrollment.id,
                        attempt,
                        "Enrollment granted"
                    );
                    return Ok(enrollment);
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.config.backoff_for(attempt);
                    warn!(
                        user_id = %user_id,
                        schedule_id = %schedule_id,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Enrollment contended, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    match &err {
                        EnrollmentError::Store(source) => error!(
                            user_id = %user_id,
                            schedule_id = %schedule_id,
                            error = %source,
                            "Enrollment failed"
                        ),
                        _ if err.is_rejection() => info!(
                            user_id = %user_id,
                            schedule_id = %schedule_id,
                            reason = err.code(),
                            "Enrollment denied"
                        ),
                        _ => warn!(
                            user_id = %user_id,
                            schedule_id = %schedule_id,
                            reason = err.code(),
                            attempt,
                            "Enrollment gave up"
                        ),
                    }
                    return Err(err);
                }
            }
        }
    }

    /// One attempt. The deadline bounds locking, checks and the insert;
    /// exceeding it drops the unit, which rolls it back. Commit runs outside
    /// the deadline so a committed enrollment is never reported as contended.
    async fn attempt(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<Enrollment, EnrollmentError> {
        let (tx, enrollment) = tokio::time::timeout(
            self.config.attempt_timeout(),
            self.admit(user_id, schedule_id),
        )
        .await
        .unwrap_or(Err(EnrollmentError::TransientConflict))?;

        tx.commit().await?;
        Ok(enrollment)
    }

    /// Lock, check and insert inside a fresh unit, returning it uncommitted.
    async fn admit(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<(Box<dyn AdmissionTx>, Enrollment), EnrollmentError> {
        let mut tx = self.store.begin(self.config.lock_timeout()).await?;

        tx.lock_user(user_id).await?;
        let schedule = tx
            .lock_schedule(schedule_id)
            .await?
            .ok_or(EnrollmentError::ScheduleNotFound)?;

        let same_event = match self.config.time_conflict_scope {
            TimeConflictScope::AllEvents => None,
            TimeConflictScope::SameEvent => Some(schedule.event_id),
        };
        if tx.has_time_conflict(user_id, &schedule, same_event).await? {
            return Err(EnrollmentError::TimeConflict);
        }

        if tx.has_enrollment(user_id, schedule.id).await? {
            return Err(EnrollmentError::DuplicateEnrollment);
        }

        let enrolled = tx.count_enrollments(schedule.id).await?;
        if schedule.is_full(enrolled) {
            return Err(EnrollmentError::CapacityExceeded);
        }

        let enrollment = tx.insert(Enrollment::new(user_id, schedule.id)).await?;
        Ok((tx, enrollment))
    }
}
