//! Listing projections over the ledger.

use std::sync::Arc;

use eventhub_core::types::{ScheduleId, UserId};
use eventhub_entity::enrollment::{ScheduleAttendeeView, UserEnrollmentView};
use eventhub_entity::schedule::ScheduleDetails;

use crate::catalog::SessionCatalog;
use crate::error::EnrollmentError;
use crate::store::EnrollmentStore;

/// Read-only enrollment listings.
#[derive(Debug, Clone)]
pub struct EnrollmentQueryService {
    /// Session catalog.
    catalog: Arc<dyn SessionCatalog>,
    /// Ledger store.
    store: Arc<dyn EnrollmentStore>,
}

impl EnrollmentQueryService {
    /// Creates a new query service.
    pub fn new(catalog: Arc<dyn SessionCatalog>, store: Arc<dyn EnrollmentStore>) -> Self {
        Self { catalog, store }
    }

    /// The user's enrollments, earliest session first.
    pub async fn enrollments_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserEnrollmentView>, EnrollmentError> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    /// The schedule's attendees in the order they enrolled.
    pub async fn enrollments_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<ScheduleAttendeeView>, EnrollmentError> {
        if self.catalog.get_schedule(schedule_id).await?.is_none() {
            return Err(EnrollmentError::ScheduleNotFound);
        }
        Ok(self.store.list_for_schedule(schedule_id).await?)
    }

    /// A schedule with its event name and start time.
    pub async fn schedule_details(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<ScheduleDetails, EnrollmentError> {
        self.catalog
            .schedule_details(schedule_id)
            .await?
            .ok_or(EnrollmentError::ScheduleNotFound)
    }
}
