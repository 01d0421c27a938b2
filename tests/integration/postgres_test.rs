//! Admission against PostgreSQL: row and advisory locks, lock timeouts and
//! the unique constraint. Run with `DATABASE_URL` set and `--ignored`.

use std::sync::Arc;
use std::time::Duration;

use eventhub_core::config::{AdmissionConfig, TimeConflictScope};
use eventhub_entity::enrollment::Enrollment;
use eventhub_service::{
    AdmissionTx, CancellationService, CapacityService, EnrollmentError, EnrollmentStore,
};

use crate::helpers::{PgTestDb, at};

fn patient() -> AdmissionConfig {
    AdmissionConfig {
        lock_timeout_ms: 5000,
        ..AdmissionConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_last_seat_goes_to_exactly_one_user() {
    let pg = PgTestDb::connect().await;
    let event = pg.create_event("Keynote").await;
    let schedule = pg.create_schedule(event, at(10), 1).await;

    let mut users = Vec::new();
    for _ in 0..20 {
        users.push(pg.create_user().await);
    }

    let engine = Arc::new(pg.engine(patient()));
    let handles: Vec<_> = users
        .into_iter()
        .map(|user| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.enroll(user, schedule).await })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => granted += 1,
            Err(EnrollmentError::CapacityExceeded) => {}
            Err(other) => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(granted, 1);
    assert_eq!(pg.store.count_for_schedule(schedule).await.unwrap(), 1);

    let capacity = CapacityService::new(pg.store.clone(), pg.store.clone());
    assert_eq!(capacity.available_seats(schedule).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_held_row_lock_surfaces_transient_conflict() {
    let pg = PgTestDb::connect().await;
    let event = pg.create_event("Workshop").await;
    let schedule = pg.create_schedule(event, at(11), 5).await;
    let user = pg.create_user().await;

    let mut blocker = pg.db.pool().begin().await.unwrap();
    sqlx::query("SELECT id FROM schedules WHERE id = $1 FOR UPDATE")
        .bind(schedule)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let engine = pg.engine(AdmissionConfig {
        max_attempts: 2,
        lock_timeout_ms: 50,
        retry_backoff_ms: 1,
        ..AdmissionConfig::default()
    });
    let err = engine.enroll(user, schedule).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::TransientConflict));
    assert_eq!(pg.store.count_for_schedule(schedule).await.unwrap(), 0);

    blocker.rollback().await.unwrap();
    engine.enroll(user, schedule).await.unwrap();
    assert_eq!(pg.store.count_for_schedule(schedule).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_same_slot_conflicts_then_reenroll_is_duplicate() {
    let pg = PgTestDb::connect().await;
    let event = pg.create_event("Track").await;
    let first = pg.create_schedule(event, at(10), 10).await;
    let second = pg.create_schedule(event, at(10), 10).await;
    let user = pg.create_user().await;
    let engine = pg.engine(patient());

    engine.enroll(user, first).await.unwrap();

    let err = engine.enroll(user, second).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::TimeConflict));

    let err = engine.enroll(user, first).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::DuplicateEnrollment));

    assert_eq!(pg.store.count_for_schedule(first).await.unwrap(), 1);
    assert_eq!(pg.store.count_for_schedule(second).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_same_event_scope_allows_parallel_events() {
    let pg = PgTestDb::connect().await;
    let talk = pg.create_event("Talk").await;
    let lab = pg.create_event("Lab").await;
    let talk_slot = pg.create_schedule(talk, at(14), 10).await;
    let talk_twin = pg.create_schedule(talk, at(14), 10).await;
    let lab_slot = pg.create_schedule(lab, at(14), 10).await;
    let user = pg.create_user().await;

    let scoped = pg.engine(AdmissionConfig {
        time_conflict_scope: TimeConflictScope::SameEvent,
        ..patient()
    });
    scoped.enroll(user, talk_slot).await.unwrap();
    scoped.enroll(user, lab_slot).await.unwrap();

    let err = scoped.enroll(user, talk_twin).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::TimeConflict));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_concurrent_same_user_same_slot_books_one() {
    let pg = PgTestDb::connect().await;
    let event = pg.create_event("Parallel").await;
    let a = pg.create_schedule(event, at(16), 10).await;
    let b = pg.create_schedule(event, at(16), 10).await;
    let user = pg.create_user().await;
    let engine = pg.engine(patient());

    let (first, second) = tokio::join!(engine.enroll(user, a), engine.enroll(user, b));

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let booked = pg.store.count_for_schedule(a).await.unwrap()
        + pg.store.count_for_schedule(b).await.unwrap();
    assert_eq!(booked, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_unique_constraint_maps_to_duplicate() {
    let pg = PgTestDb::connect().await;
    let event = pg.create_event("Seminar").await;
    let schedule = pg.create_schedule(event, at(9), 10).await;
    let user = pg.create_user().await;

    let mut tx = pg.store.begin(Duration::from_secs(5)).await.unwrap();
    tx.insert(Enrollment::new(user, schedule)).await.unwrap();
    let err = tx.insert(Enrollment::new(user, schedule)).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::DuplicateEnrollment));
    drop(tx);

    assert_eq!(pg.store.count_for_schedule(schedule).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_cancel_frees_the_seat_once() {
    let pg = PgTestDb::connect().await;
    let event = pg.create_event("Lecture").await;
    let schedule = pg.create_schedule(event, at(13), 1).await;
    let user = pg.create_user().await;
    let other = pg.create_user().await;
    let engine = pg.engine(patient());
    let cancellation = CancellationService::new(pg.store.clone());

    engine.enroll(user, schedule).await.unwrap();
    let err = engine.enroll(other, schedule).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::CapacityExceeded));

    cancellation.cancel(user, schedule).await.unwrap();
    let err = cancellation.cancel(user, schedule).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound));

    engine.enroll(other, schedule).await.unwrap();
}
