//! Schedule domain entities.

pub mod model;

pub use model::{Schedule, ScheduleDetails, SeatSummary};
