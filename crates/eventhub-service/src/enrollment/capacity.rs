//! Seat availability reads.

use std::sync::Arc;

use eventhub_core::types::ScheduleId;
use eventhub_entity::schedule::SeatSummary;

use crate::catalog::SessionCatalog;
use crate::error::EnrollmentError;
use crate::store::EnrollmentStore;

/// Reports remaining seats.
///
/// Reads are not locked and may be stale by the time the caller acts on
/// them; admission re-checks capacity under lock.
#[derive(Debug, Clone)]
pub struct CapacityService {
    /// Session catalog.
    catalog: Arc<dyn SessionCatalog>,
    /// Ledger store.
    store: Arc<dyn EnrollmentStore>,
}

impl CapacityService {
    /// Creates a new capacity service.
    pub fn new(catalog: Arc<dyn SessionCatalog>, store: Arc<dyn EnrollmentStore>) -> Self {
        Self { catalog, store }
    }

    /// `capacity - enrolled` for a schedule, floored at zero.
    pub async fn available_seats(&self, schedule_id: ScheduleId) -> Result<i64, EnrollmentError> {
        self.seat_summary(schedule_id)
            .await
            .map(|summary| summary.available)
    }

    /// Capacity, enrolled count and available seats for a schedule.
    pub async fn seat_summary(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<SeatSummary, EnrollmentError> {
        let schedule = self
            .catalog
            .get_schedule(schedule_id)
            .await?
            .ok_or(EnrollmentError::ScheduleNotFound)?;
        let enrolled = self.store.count_for_schedule(schedule_id).await?;

        Ok(SeatSummary {
            schedule_id,
            capacity: schedule.capacity,
            enrolled,
            available: schedule.seats_left(enrolled),
        })
    }
}
