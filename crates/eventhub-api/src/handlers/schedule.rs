//! Schedule handlers: details, attendee roster, seat availability.

use axum::Json;
use axum::extract::{Path, State};

use eventhub_core::types::ScheduleId;
use eventhub_entity::enrollment::ScheduleAttendeeView;
use eventhub_entity::schedule::{ScheduleDetails, SeatSummary};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

/// GET /api/schedules/{schedule_id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> Result<Json<ApiResponse<ScheduleDetails>>, ApiError> {
    let schedule_id: ScheduleId = parse_id(&schedule_id, "schedule id")?;
    let details = state.services.queries.schedule_details(schedule_id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

/// GET /api/schedules/{schedule_id}/enrollments
pub async fn list_attendees(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(schedule_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ScheduleAttendeeView>>>, ApiError> {
    let schedule_id: ScheduleId = parse_id(&schedule_id, "schedule id")?;
    let attendees = state
        .services
        .queries
        .enrollments_for_schedule(schedule_id)
        .await?;
    Ok(Json(ApiResponse::ok(attendees)))
}

/// GET /api/schedules/{schedule_id}/seats
pub async fn seats(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> Result<Json<ApiResponse<SeatSummary>>, ApiError> {
    let schedule_id: ScheduleId = parse_id(&schedule_id, "schedule id")?;
    let summary = state.services.capacity.seat_summary(schedule_id).await?;
    Ok(Json(ApiResponse::ok(summary)))
}
