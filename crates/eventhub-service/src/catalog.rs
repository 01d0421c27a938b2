//! Read-only view of the session catalog.

use async_trait::async_trait;

use eventhub_core::result::AppResult;
use eventhub_core::types::ScheduleId;
use eventhub_entity::schedule::{Schedule, ScheduleDetails};

/// Schedule lookups served by the external session catalog.
#[async_trait]
pub trait SessionCatalog: Send + Sync + std::fmt::Debug {
    /// Resolve a schedule by ID.
    async fn get_schedule(&self, id: ScheduleId) -> AppResult<Option<Schedule>>;

    /// Resolve a schedule joined with its event for display.
    async fn schedule_details(&self, id: ScheduleId) -> AppResult<Option<ScheduleDetails>>;
}
