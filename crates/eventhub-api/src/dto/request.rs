//! Request DTOs.

use serde::{Deserialize, Serialize};

use eventhub_core::types::ScheduleId;

/// Enroll request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollRequest {
    /// Schedule to take a seat in.
    pub schedule_id: ScheduleId,
}
