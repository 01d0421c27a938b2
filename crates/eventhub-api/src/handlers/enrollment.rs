//! Enrollment handlers: enroll, list own enrollments, cancel.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use eventhub_core::types::{EnrollmentId, ScheduleId};
use eventhub_entity::enrollment::{Enrollment, UserEnrollmentView};

use crate::dto::request::EnrollRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

/// POST /api/enrollments
pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Enrollment>>), ApiError> {
    let enrollment = state
        .services
        .admission
        .enroll(auth.user_id(), req.schedule_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(enrollment))))
}

/// GET /api/enrollments/me
pub async fn my_enrollments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserEnrollmentView>>>, ApiError> {
    let enrollments = state
        .services
        .queries
        .enrollments_for_user(auth.user_id())
        .await?;

    Ok(Json(ApiResponse::ok(enrollments)))
}

/// DELETE /api/enrollments/schedule/{schedule_id}
pub async fn cancel_for_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(schedule_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let schedule_id: ScheduleId = parse_id(&schedule_id, "schedule id")?;

    state
        .services
        .cancellation
        .cancel(auth.user_id(), schedule_id)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Enrollment cancelled",
    ))))
}

/// DELETE /api/enrollments/{enrollment_id}
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(enrollment_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let enrollment_id: EnrollmentId = parse_id(&enrollment_id, "enrollment id")?;

    state
        .services
        .cancellation
        .cancel_enrollment(auth.user_id(), enrollment_id)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Enrollment cancelled",
    ))))
}
