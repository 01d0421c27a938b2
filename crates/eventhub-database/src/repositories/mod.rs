//! Repository implementations for the catalog and the enrollment ledger.

pub mod enrollment;
pub mod schedule;

pub use enrollment::EnrollmentRepository;
pub use schedule::ScheduleRepository;
