//! Outcomes of enrollment operations.

use thiserror::Error;

use eventhub_core::error::AppError;

/// Every way an enrollment operation can fail.
///
/// Callers match on the variant; the display text is for humans only.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// The schedule does not exist in the catalog.
    #[error("Schedule not found")]
    ScheduleNotFound,
    /// Every seat in the schedule is taken.
    #[error("No seats available in this schedule")]
    CapacityExceeded,
    /// The user already holds a seat in this schedule.
    #[error("Already enrolled in this schedule")]
    DuplicateEnrollment,
    /// The user holds a seat in another session starting at the same time.
    #[error("Already enrolled in another session at the same time")]
    TimeConflict,
    /// Storage contention outlasted every retry.
    #[error("Enrollment is contended, try again")]
    TransientConflict,
    /// No matching enrollment exists.
    #[error("Enrollment not found")]
    NotFound,
    /// The enrollment belongs to a different user.
    #[error("Enrollment belongs to another user")]
    NotOwner,
    /// Infrastructure failure.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl EnrollmentError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ScheduleNotFound => "SCHEDULE_NOT_FOUND",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::DuplicateEnrollment => "DUPLICATE_ENROLLMENT",
            Self::TimeConflict => "TIME_CONFLICT",
            Self::TransientConflict => "TRANSIENT_CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::NotOwner => "NOT_OWNER",
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the admission engine may retry the whole attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientConflict)
    }

    /// Whether this is a deterministic business-rule rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ScheduleNotFound
                | Self::CapacityExceeded
                | Self::DuplicateEnrollment
                | Self::TimeConflict
        )
    }
}
