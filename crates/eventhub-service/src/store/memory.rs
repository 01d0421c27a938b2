//! In-memory catalog and ledger using a Tokio mutex for single-node
//! deployments and tests.
//!
//! An admission unit owns the mutex guard from `begin` until it is
//! committed or dropped, so units run one at a time. Writes are buffered
//! in the unit and applied on commit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use eventhub_core::result::AppResult;
use eventhub_core::types::{EnrollmentId, EventId, ScheduleId, UserId};
use eventhub_entity::enrollment::{Enrollment, ScheduleAttendeeView, UserEnrollmentView};
use eventhub_entity::event::Event;
use eventhub_entity::schedule::{Schedule, ScheduleDetails};
use eventhub_entity::user::UserProfile;

use super::{AdmissionTx, EnrollmentStore};
use crate::catalog::SessionCatalog;
use crate::error::EnrollmentError;

/// Catalog rows and the ledger.
#[derive(Debug, Default)]
struct MemoryState {
    events: HashMap<EventId, Event>,
    schedules: HashMap<ScheduleId, Schedule>,
    users: HashMap<UserId, UserProfile>,
    /// Committed enrollments in insertion order.
    enrollments: Vec<Enrollment>,
}

impl MemoryState {
    fn count(&self, schedule_id: ScheduleId) -> i64 {
        self.enrollments
            .iter()
            .filter(|e| e.schedule_id == schedule_id)
            .count() as i64
    }

    fn contains(&self, user_id: UserId, schedule_id: ScheduleId) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.user_id == user_id && e.schedule_id == schedule_id)
    }

    fn schedule_of(&self, enrollment: &Enrollment) -> Option<&Schedule> {
        self.schedules.get(&enrollment.schedule_id)
    }
}

/// Catalog rows loaded into a memory store at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    /// Events.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Schedules.
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    /// User profiles.
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

/// In-memory store implementing both the catalog and the ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnrollmentStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEnrollmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a catalog event.
    pub async fn add_event(&self, event: Event) {
        self.state.lock().await.events.insert(event.id, event);
    }

    /// Add or replace a catalog schedule.
    pub async fn add_schedule(&self, schedule: Schedule) {
        self.state.lock().await.schedules.insert(schedule.id, schedule);
    }

    /// Add or replace a user profile.
    pub async fn add_user(&self, user: UserProfile) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Load catalog rows, replacing entries with the same ID.
    pub async fn seed(&self, seed: CatalogSeed) {
        let mut state = self.state.lock().await;
        let (events, schedules, users) =
            (seed.events.len(), seed.schedules.len(), seed.users.len());
        state.events.extend(seed.events.into_iter().map(|e| (e.id, e)));
        state
            .schedules
            .extend(seed.schedules.into_iter().map(|s| (s.id, s)));
        state.users.extend(seed.users.into_iter().map(|u| (u.id, u)));
        info!(events, schedules, users, "Memory catalog seeded");
    }

    /// Remove a schedule and every enrollment in it.
    pub async fn remove_schedule(&self, schedule_id: ScheduleId) -> bool {
        let mut state = self.state.lock().await;
        state.enrollments.retain(|e| e.schedule_id != schedule_id);
        let removed = state.schedules.remove(&schedule_id).is_some();
        if removed {
            info!(schedule_id = %schedule_id, "Schedule removed with its enrollments");
        }
        removed
    }
}

#[async_trait]
impl SessionCatalog for MemoryEnrollmentStore {
    async fn get_schedule(&self, id: ScheduleId) -> AppResult<Option<Schedule>> {
        Ok(self.state.lock().await.schedules.get(&id).cloned())
    }

    async fn schedule_details(&self, id: ScheduleId) -> AppResult<Option<ScheduleDetails>> {
        let state = self.state.lock().await;
        let details = state.schedules.get(&id).and_then(|schedule| {
            state.events.get(&schedule.event_id).map(|event| ScheduleDetails {
                schedule_id: schedule.id,
                event_id: event.id,
                event_name: event.name.clone(),
                location: event.location.clone(),
                start_time: schedule.start_time,
                capacity: schedule.capacity,
            })
        });
        Ok(details)
    }
}

#[async_trait]
impl EnrollmentStore for MemoryEnrollmentStore {
    async fn begin(&self, lock_timeout: Duration) -> Result<Box<dyn AdmissionTx>, EnrollmentError> {
        let guard = tokio::time::timeout(lock_timeout, Arc::clone(&self.state).lock_owned())
            .await
            .map_err(|_| {
                debug!(
                    timeout_ms = u64::try_from(lock_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Ledger lock wait timed out"
                );
                EnrollmentError::TransientConflict
            })?;

        Ok(Box::new(MemoryAdmissionTx {
            state: guard,
            pending: Vec::new(),
        }))
    }

    async fn find_enrollment(&self, id: EnrollmentId) -> AppResult<Option<Enrollment>> {
        let state = self.state.lock().await;
        Ok(state.enrollments.iter().find(|e| e.id == id).cloned())
    }

    async fn count_for_schedule(&self, schedule_id: ScheduleId) -> AppResult<i64> {
        Ok(self.state.lock().await.count(schedule_id))
    }

    async fn delete_for_user(&self, user_id: UserId, schedule_id: ScheduleId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.enrollments.len();
        state
            .enrollments
            .retain(|e| !(e.user_id == user_id && e.schedule_id == schedule_id));
        Ok((before - state.enrollments.len()) as u64)
    }

    async fn delete_by_id_for_user(&self, id: EnrollmentId, user_id: UserId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.enrollments.len();
        state
            .enrollments
            .retain(|e| !(e.id == id && e.user_id == user_id));
        Ok((before - state.enrollments.len()) as u64)
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserEnrollmentView>> {
        let state = self.state.lock().await;
        let mut views: Vec<UserEnrollmentView> = state
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter_map(|e| {
                let schedule = state.schedule_of(e)?;
                let event = state.events.get(&schedule.event_id)?;
                Some(UserEnrollmentView {
                    enrollment_id: e.id,
                    schedule_id: schedule.id,
                    event_id: event.id,
                    event_name: event.name.clone(),
                    description: event.description.clone(),
                    location: event.location.clone(),
                    event_type: event.event_type.clone(),
                    duration: event.duration,
                    start_time: schedule.start_time,
                    capacity: schedule.capacity,
                })
            })
            .collect();
        // Stable sort keeps insertion order among equal start times.
        views.sort_by_key(|v| v.start_time);
        Ok(views)
    }

    async fn list_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> AppResult<Vec<ScheduleAttendeeView>> {
        let state = self.state.lock().await;
        let attendees = state
            .enrollments
            .iter()
            .filter(|e| e.schedule_id == schedule_id)
            .filter_map(|e| {
                let user = state.users.get(&e.user_id)?;
                Some(ScheduleAttendeeView {
                    enrollment_id: e.id,
                    user_id: user.id,
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    email: user.email.clone(),
                    school: user.school.clone(),
                    year: user.year.clone(),
                    course: user.course.clone(),
                    enrolled_at: e.created_at,
                })
            })
            .collect();
        Ok(attendees)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Admission unit holding the store lock.
struct MemoryAdmissionTx {
    state: OwnedMutexGuard<MemoryState>,
    /// Inserts applied on commit.
    pending: Vec<Enrollment>,
}

impl MemoryAdmissionTx {
    fn visible(&self) -> impl Iterator<Item = &Enrollment> {
        self.state.enrollments.iter().chain(self.pending.iter())
    }
}

#[async_trait]
impl AdmissionTx for MemoryAdmissionTx {
    async fn lock_user(&mut self, _user_id: UserId) -> Result<(), EnrollmentError> {
        // The unit already holds the whole store.
        Ok(())
    }

    async fn lock_schedule(
        &mut self,
        schedule_id: ScheduleId,
    ) -> Result<Option<Schedule>, EnrollmentError> {
        Ok(self.state.schedules.get(&schedule_id).cloned())
    }

    async fn has_time_conflict(
        &mut self,
        user_id: UserId,
        schedule: &Schedule,
        same_event: Option<EventId>,
    ) -> Result<bool, EnrollmentError> {
        let conflict = self
            .visible()
            .filter(|e| e.user_id == user_id && e.schedule_id != schedule.id)
            .filter_map(|e| self.state.schedule_of(e))
            .any(|other| {
                other.start_time == schedule.start_time
                    && same_event.is_none_or(|event_id| other.event_id == event_id)
            });
        Ok(conflict)
    }

    async fn has_enrollment(
        &mut self,
        user_id: UserId,
        schedule_id: ScheduleId,
    ) -> Result<bool, EnrollmentError> {
        Ok(self
            .visible()
            .any(|e| e.user_id == user_id && e.schedule_id == schedule_id))
    }

    async fn count_enrollments(&mut self, schedule_id: ScheduleId) -> Result<i64, EnrollmentError> {
        let pending = self
            .pending
            .iter()
            .filter(|e| e.schedule_id == schedule_id)
            .count() as i64;
        Ok(self.state.count(schedule_id) + pending)
    }

    async fn insert(&mut self, enrollment: Enrollment) -> Result<Enrollment, EnrollmentError> {
        let taken = self.state.contains(enrollment.user_id, enrollment.schedule_id)
            || self
                .pending
                .iter()
                .any(|e| e.user_id == enrollment.user_id && e.schedule_id == enrollment.schedule_id);
        if taken {
            return Err(EnrollmentError::DuplicateEnrollment);
        }
        self.pending.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn commit(self: Box<Self>) -> Result<(), EnrollmentError> {
        let MemoryAdmissionTx { mut state, pending } = *self;
        state.enrollments.extend(pending);
        Ok(())
    }
}
