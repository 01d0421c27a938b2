//! Enrollment ledger storage.
//!
//! Provides the ledger behind one of two backends:
//! - PostgreSQL (row lock on the schedule plus an advisory lock on the user)
//! - In-memory (one `tokio::sync::Mutex` held for the whole admission unit)
//!
//! Both use the same pessimistic strategy: an admission unit holds its
//! locks from [`EnrollmentStore::begin`] (or the first lock call) until it
//! is committed or dropped.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;

use eventhub_core::result::AppResult;
use eventhub_core::types::{EnrollmentId, EventId, ScheduleId, UserId};
use eventhub_entity::enrollment::{Enrollment, ScheduleAttendeeView, UserEnrollmentView};
use eventhub_entity::schedule::Schedule;

use crate::error::EnrollmentError;

pub use memory::{CatalogSeed, MemoryEnrollmentStore};
pub use postgres::PgEnrollmentStore;

/// The persisted set of enrollment records.
#[async_trait]
pub trait EnrollmentStore: Send + Sync + std::fmt::Debug {
    /// Open an admission unit.
    ///
    /// Lock waits inside the unit are bounded by `lock_timeout`; exceeding it
    /// yields [`EnrollmentError::TransientConflict`]. Dropping the handle
    /// without committing discards every write made through it.
    async fn begin(&self, lock_timeout: Duration) -> Result<Box<dyn AdmissionTx>, EnrollmentError>;

    /// Find an enrollment by ID.
    async fn find_enrollment(&self, id: EnrollmentId) -> AppResult<Option<Enrollment>>;

    /// Current number of enrollments in a schedule.
    async fn count_for_schedule(&self, schedule_id: ScheduleId) -> AppResult<i64>;

    /// Remove the user's enrollment in a schedule. Returns rows removed.
    async fn delete_for_user(&self, user_id: UserId, schedule_id: ScheduleId) -> AppResult<u64>;

    /// Remove an enrollment by ID if it belongs to the user. Returns rows removed.
    async fn delete_by_id_for_user(&self, id: EnrollmentId, user_id: UserId) -> AppResult<u64>;

    /// A user's enrollments ordered by session start time.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserEnrollmentView>>;

    /// A schedule's attendees in enrollment order.
    async fn list_for_schedule(&self, schedule_id: ScheduleId)
    -> AppResult<Vec<ScheduleAttendeeView>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// One atomic admission unit.
///
/// Callers lock the user, then the schedule, then read and write. The
/// order is fixed so two units never wait on each other in reverse.
#[async_trait]
pub trait AdmissionTx: Send {
    /// Serialize this unit against other units for the same user.
    async fn lock_user(&mut self, user_id: UserId) -> Result<(), EnrollmentError>;

    /// Resolve and lock the schedule. `None` if it does not exist.
    async fn lock_schedule(
        &mut self,
        schedule_id: ScheduleId,
    ) -> Result<Option<Schedule>, EnrollmentError>;

    /// Whether the user holds a seat in a different schedule with the same
    /// start time, restricted to `same_event` when given.
    async fn has_time_conflict(
        &mut self,
        user_id: UserId,
        schedule: &Schedule,
        same_event: Option<EventId>,
    ) -> Result<bool, EnrollmentError>;

    /// Whether the user already holds a seat in the schedule.
    async fn has_enrollment(
        &mut self,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<bool, EnrollmentError>;

    /// Number of seats taken in the schedule, as seen by this unit.
    async fn count_enrollments(&mut self, schedule_id: ScheduleId) -> Result<i64, EnrollmentError>;

    /// Write the enrollment row.
    async fn insert(&mut self, enrollment: Enrollment) -> Result<Enrollment, EnrollmentError>;

    /// Make the unit's writes durable and release its locks.
    async fn commit(self: Box<Self>) -> Result<(), EnrollmentError>;
}
