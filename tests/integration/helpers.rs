//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{DateTime, TimeZone, Utc};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use sqlx::postgres::PgPoolOptions;

use eventhub_api::{AppState, build_router};
use eventhub_core::config::{AdmissionConfig, AppConfig, StoreBackend};
use eventhub_core::types::{EventId, ScheduleId, UserId};
use eventhub_database::DatabasePool;
use eventhub_entity::event::Event;
use eventhub_entity::schedule::Schedule;
use eventhub_entity::user::UserProfile;
use eventhub_service::{
    AdmissionEngine, EnrollmentStore, MemoryEnrollmentStore, PgEnrollmentStore,
};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for seeding and direct checks
    pub store: MemoryEnrollmentStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with default settings
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a new test application over a fresh memory store
    pub async fn with_config(mut config: AppConfig) -> Self {
        config.store.backend = StoreBackend::Memory;
        config.validate().expect("Invalid test config");

        let store = MemoryEnrollmentStore::new();
        let shared = Arc::new(store.clone());
        let state = AppState::new(config.clone(), shared.clone(), shared);
        let router = build_router(state);

        Self {
            router,
            store,
            config,
        }
    }

    /// Add a catalog event and return its ID
    pub async fn create_event(&self, name: &str) -> EventId {
        let id = EventId::new();
        self.store
            .add_event(Event {
                id,
                name: name.to_string(),
                description: Some(format!("{name} description")),
                author: None,
                location: Some("Room 101".to_string()),
                photo: None,
                event_type: Some("talk".to_string()),
                duration: Some(60),
            })
            .await;
        id
    }

    /// Add a schedule of an event and return its ID
    pub async fn create_schedule(
        &self,
        event_id: EventId,
        start_time: DateTime<Utc>,
        capacity: i32,
    ) -> ScheduleId {
        let id = ScheduleId::new();
        self.store
            .add_schedule(Schedule {
                id,
                event_id,
                start_time,
                capacity,
            })
            .await;
        id
    }

    /// Add a user profile and return its ID
    pub async fn create_user(&self, first_name: &str) -> UserId {
        let id = UserId::new();
        self.store
            .add_user(UserProfile {
                id,
                first_name: first_name.to_string(),
                last_name: "Test".to_string(),
                email: format!("{}@test.com", first_name.to_lowercase()),
                school: Some("Test School".to_string()),
                year: Some("2".to_string()),
                course: Some("Computer Science".to_string()),
            })
            .await;
        id
    }

    /// POST /api/enrollments for a user
    pub async fn enroll(&self, user: UserId, schedule_id: ScheduleId) -> TestResponse {
        self.request(
            "POST",
            "/api/enrollments",
            Some(serde_json::json!({ "schedule_id": schedule_id })),
            Some(user),
        )
        .await
    }

    /// Enroll request carrying the user id under an explicit header name
    pub async fn request_with_header(
        &self,
        header: &str,
        value: &str,
        schedule_id: ScheduleId,
    ) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/enrollments")
            .header("Content-Type", "application/json")
            .header(header, value)
            .body(Body::from(
                serde_json::json!({ "schedule_id": schedule_id }).to_string(),
            ))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Committed enrollments in a schedule
    pub async fn store_count(&self, schedule_id: ScheduleId) -> i64 {
        self.store
            .count_for_schedule(schedule_id)
            .await
            .expect("Failed to count enrollments")
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<UserId>,
    ) -> TestResponse {
        let user = user.map(|u| u.to_string());
        self.raw_request(method, path, body, user.as_deref()).await
    }

    /// Make an HTTP request with an arbitrary user header value
    pub async fn raw_request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user_header: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(value) = user_header {
            req = req.header(self.config.auth.user_header.as_str(), value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Ledger over a real PostgreSQL database named by `DATABASE_URL`.
///
/// Every row it creates uses fresh IDs, so tests can share one database
/// and run in parallel without cleaning it.
pub struct PgTestDb {
    /// Pool wrapper shared with the store
    pub db: DatabasePool,
    /// Catalog and ledger under test
    pub store: Arc<PgEnrollmentStore>,
}

impl PgTestDb {
    /// Connect to the test database and apply migrations
    pub async fn connect() -> Self {
        let url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must name a test database");
        let pool = PgPoolOptions::new()
            .max_connections(24)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");
        let db = DatabasePool::from_pool(pool);

        eventhub_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let store = Arc::new(PgEnrollmentStore::new(db.clone()));
        Self { db, store }
    }

    /// Admission engine over this ledger
    pub fn engine(&self, config: AdmissionConfig) -> AdmissionEngine {
        AdmissionEngine::new(self.store.clone(), config)
    }

    /// Insert a catalog event and return its ID
    pub async fn create_event(&self, name: &str) -> EventId {
        let id = EventId::new();
        sqlx::query(
            "INSERT INTO events (id, name, location, type, duration) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(name)
        .bind("Room 101")
        .bind("talk")
        .bind(60_i32)
        .execute(self.db.pool())
        .await
        .expect("Failed to insert event");
        id
    }

    /// Insert a schedule of an event and return its ID
    pub async fn create_schedule(
        &self,
        event_id: EventId,
        start_time: DateTime<Utc>,
        capacity: i32,
    ) -> ScheduleId {
        let id = ScheduleId::new();
        sqlx::query(
            "INSERT INTO schedules (id, event_id, start_time, capacity) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(event_id)
        .bind(start_time)
        .bind(capacity)
        .execute(self.db.pool())
        .await
        .expect("Failed to insert schedule");
        id
    }

    /// Insert a user and return its ID
    pub async fn create_user(&self) -> UserId {
        let id = UserId::new();
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password) \
             VALUES ($1, 'Test', 'User', $2, 'unused')",
        )
        .bind(id)
        .bind(format!("{id}@test.com"))
        .execute(self.db.pool())
        .await
        .expect("Failed to insert user");
        id
    }
}

/// A fixed session time.
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 3, hour, 0, 0).unwrap()
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The `data` member of a success body.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}
