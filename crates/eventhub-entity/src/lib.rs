//! # eventhub-entity
//!
//! Domain entity models for EventHub. Every struct in this crate represents
//! a database row or a read projection joined for display. Database rows
//! derive `sqlx::FromRow`.
//!
//! `Schedule`, `Event` and `UserProfile` are owned by external
//! collaborators (the session catalog and the auth service) and are only
//! read here. `Enrollment` is the ledger row owned by the enrollment core.

pub mod enrollment;
pub mod event;
pub mod schedule;
pub mod user;

pub use enrollment::{Enrollment, ScheduleAttendeeView, UserEnrollmentView};
pub use event::Event;
pub use schedule::{Schedule, ScheduleDetails, SeatSummary};
pub use user::UserProfile;
