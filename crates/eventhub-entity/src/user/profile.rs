//! User profile model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eventhub_core::types::UserId;

/// Public profile fields of a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    /// User identifier.
    pub id: UserId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// School.
    pub school: Option<String>,
    /// School year.
    pub year: Option<String>,
    /// Course.
    pub course: Option<String>,
}
