//! Event entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eventhub_core::types::EventId;

/// A catalog event; each event runs in one or more schedules.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Long description.
    pub description: Option<String>,
    /// Organizer or speaker.
    pub author: Option<String>,
    /// Where the event takes place.
    pub location: Option<String>,
    /// Cover image URL.
    pub photo: Option<String>,
    /// Free-form category (talk, workshop, ...).
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Duration in minutes.
    pub duration: Option<i32>,
}
