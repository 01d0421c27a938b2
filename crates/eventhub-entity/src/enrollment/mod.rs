//! Enrollment ledger entities and read projections.

pub mod model;
pub mod view;

pub use model::Enrollment;
pub use view::{ScheduleAttendeeView, UserEnrollmentView};
