//! Integration tests for enrolling and cancelling over HTTP.

use std::sync::Arc;

use http::StatusCode;

use eventhub_core::config::{AppConfig, TimeConflictScope};
use eventhub_core::types::{ScheduleId, UserId};

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_enroll_returns_created_enrollment() {
    let app = TestApp::new().await;
    let event = app.create_event("Keynote").await;
    let schedule = app.create_schedule(event, helpers::at(9), 10).await;
    let user = app.create_user("Grace").await;

    let response = app.enroll(user, schedule).await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["user_id"], user.to_string());
    assert_eq!(response.data()["schedule_id"], schedule.to_string());
    assert!(response.data()["id"].is_string());
}

#[tokio::test]
async fn test_enroll_requires_user_header() {
    let app = TestApp::new().await;
    let event = app.create_event("Keynote").await;
    let schedule = app.create_schedule(event, helpers::at(9), 10).await;
    let body = serde_json::json!({ "schedule_id": schedule });

    let missing = app
        .raw_request("POST", "/api/enrollments", Some(body.clone()), None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error_code(), "UNAUTHORIZED");

    let malformed = app
        .raw_request("POST", "/api/enrollments", Some(body), Some("user-42"))
        .await;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.store_count(schedule).await, 0);
}

#[tokio::test]
async fn test_user_header_name_is_configurable() {
    let mut config = AppConfig::default();
    config.auth.user_header = "x-authenticated-user".to_string();
    let app = TestApp::with_config(config).await;
    let event = app.create_event("Keynote").await;
    let schedule = app.create_schedule(event, helpers::at(9), 10).await;

    let response = app.enroll(UserId::new(), schedule).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let wrong_header = app
        .request_with_header("x-user-id", &UserId::new().to_string(), schedule)
        .await;
    assert_eq!(wrong_header.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_schedule_is_conflict() {
    let app = TestApp::new().await;
    let event = app.create_event("Lab").await;
    let schedule = app.create_schedule(event, helpers::at(9), 2).await;

    assert_eq!(app.enroll(UserId::new(), schedule).await.status, StatusCode::CREATED);
    assert_eq!(app.enroll(UserId::new(), schedule).await.status, StatusCode::CREATED);

    let response = app.enroll(UserId::new(), schedule).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CAPACITY_EXCEEDED");
    assert_eq!(app.store_count(schedule).await, 2);
}

#[tokio::test]
async fn test_same_slot_then_reenroll() {
    let app = TestApp::new().await;
    let event = app.create_event("Track").await;
    let first = app.create_schedule(event, helpers::at(10), 10).await;
    let second = app.create_schedule(event, helpers::at(10), 10).await;
    let user = UserId::new();

    assert_eq!(app.enroll(user, first).await.status, StatusCode::CREATED);

    let conflict = app.enroll(user, second).await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);
    assert_eq!(conflict.error_code(), "TIME_CONFLICT");

    let duplicate = app.enroll(user, first).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error_code(), "DUPLICATE_ENROLLMENT");
}

#[tokio::test]
async fn test_same_event_scope_over_http() {
    let mut config = AppConfig::default();
    config.admission.time_conflict_scope = TimeConflictScope::SameEvent;
    let app = TestApp::with_config(config).await;
    let talk = app.create_event("Talk").await;
    let lab = app.create_event("Lab").await;
    let talk_morning = app.create_schedule(talk, helpers::at(10), 10).await;
    let talk_repeat = app.create_schedule(talk, helpers::at(10), 10).await;
    let lab_morning = app.create_schedule(lab, helpers::at(10), 10).await;
    let user = UserId::new();

    assert_eq!(app.enroll(user, talk_morning).await.status, StatusCode::CREATED);
    assert_eq!(app.enroll(user, lab_morning).await.status, StatusCode::CREATED);

    let response = app.enroll(user, talk_repeat).await;
    assert_eq!(response.error_code(), "TIME_CONFLICT");
}

#[tokio::test]
async fn test_unknown_schedule_is_not_found() {
    let app = TestApp::new().await;

    let response = app.enroll(UserId::new(), ScheduleId::new()).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "SCHEDULE_NOT_FOUND");
}

#[tokio::test]
async fn test_my_enrollments_by_start_time() {
    let app = TestApp::new().await;
    let event = app.create_event("Conference").await;
    let afternoon = app.create_schedule(event, helpers::at(15), 10).await;
    let morning = app.create_schedule(event, helpers::at(9), 10).await;
    let user = UserId::new();
    app.enroll(user, afternoon).await;
    app.enroll(user, morning).await;
    app.enroll(UserId::new(), morning).await;

    let response = app
        .request("GET", "/api/enrollments/me", None, Some(user))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let items = response.data().as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["schedule_id"], morning.to_string());
    assert_eq!(items[1]["schedule_id"], afternoon.to_string());
    assert_eq!(items[0]["event_name"], "Conference");
    assert_eq!(items[0]["capacity"], 10);
}

#[tokio::test]
async fn test_cancel_by_schedule_twice() {
    let app = TestApp::new().await;
    let event = app.create_event("Seminar").await;
    let schedule = app.create_schedule(event, helpers::at(11), 1).await;
    let user = UserId::new();
    app.enroll(user, schedule).await;

    let path = format!("/api/enrollments/schedule/{schedule}");
    let first = app.request("DELETE", &path, None, Some(user)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(app.store_count(schedule).await, 0);

    let second = app.request("DELETE", &path, None, Some(user)).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
    assert_eq!(second.error_code(), "NOT_FOUND");

    // The freed seat can be taken again.
    assert_eq!(app.enroll(UserId::new(), schedule).await.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_cancel_by_id_checks_owner() {
    let app = TestApp::new().await;
    let event = app.create_event("Seminar").await;
    let schedule = app.create_schedule(event, helpers::at(11), 5).await;
    let owner = UserId::new();
    let created = app.enroll(owner, schedule).await;
    let enrollment_id = created.data()["id"].as_str().expect("id").to_string();
    let path = format!("/api/enrollments/{enrollment_id}");

    let foreign = app.request("DELETE", &path, None, Some(UserId::new())).await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);
    assert_eq!(foreign.error_code(), "NOT_OWNER");
    assert_eq!(app.store_count(schedule).await, 1);

    let own = app.request("DELETE", &path, None, Some(owner)).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(app.store_count(schedule).await, 0);
}

#[tokio::test]
async fn test_malformed_path_id_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "DELETE",
            "/api/enrollments/schedule/not-a-uuid",
            None,
            Some(UserId::new()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_last_seat() {
    let app = Arc::new(TestApp::new().await);
    let event = app.create_event("Exclusive").await;
    let schedule = app.create_schedule(event, helpers::at(18), 1).await;

    let first = tokio::spawn({
        let app = Arc::clone(&app);
        async move { app.enroll(UserId::new(), schedule).await }
    });
    let second = tokio::spawn({
        let app = Arc::clone(&app);
        async move { app.enroll(UserId::new(), schedule).await }
    });

    let mut statuses = vec![
        first.await.expect("task").status,
        second.await.expect("task").status,
    ];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(app.store_count(schedule).await, 1);
}
