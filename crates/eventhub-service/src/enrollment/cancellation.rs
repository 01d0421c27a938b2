//! Enrollment cancellation.

use std::sync::Arc;

use tracing::info;

use eventhub_core::types::{EnrollmentId, ScheduleId, UserId};

use crate::error::EnrollmentError;
use crate::store::EnrollmentStore;

/// Removes enrollments on behalf of their owner.
///
/// Deletion runs outside any admission unit: a delete can only free a
/// seat, so it never needs the schedule lock.
#[derive(Debug, Clone)]
pub struct CancellationService {
    /// Ledger store.
    store: Arc<dyn EnrollmentStore>,
}

impl CancellationService {
    /// Creates a new cancellation service.
    pub fn new(store: Arc<dyn EnrollmentStore>) -> Self {
        Self { store }
    }

    /// Cancel the user's enrollment in a schedule.
    pub async fn cancel(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<(), EnrollmentError> {
        let removed = self.store.delete_for_user(user_id, schedule_id).await?;
        if removed == 0 {
            return Err(EnrollmentError::NotFound);
        }

        info!(user_id = %user_id, schedule_id = %schedule_id, "Enrollment cancelled");
        Ok(())
    }

    /// Cancel an enrollment by ID. Only its owner may do so.
    pub async fn cancel_enrollment(
        &self,
        acting_user_id: UserId,
        enrollment_id: EnrollmentId,
    ) -> Result<(), EnrollmentError> {
        let enrollment = self
            .store
            .find_enrollment(enrollment_id)
            .await?
            .ok_or(EnrollmentError::NotFound)?;

        if !enrollment.is_owned_by(acting_user_id) {
            return Err(EnrollmentError::NotOwner);
        }

        // A concurrent cancel may have removed it since the lookup.
        let removed = self
            .store
            .delete_by_id_for_user(enrollment_id, acting_user_id)
            .await?;
        if removed == 0 {
            return Err(EnrollmentError::NotFound);
        }

        info!(
            user_id = %acting_user_id,
            enrollment_id = %enrollment_id,
            schedule_id = %enrollment.schedule_id,
            "Enrollment cancelled"
        );
        Ok(())
    }
}
