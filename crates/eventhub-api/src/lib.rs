//! # eventhub-api
//!
//! HTTP API layer for EventHub enrollments built on Axum.
//!
//! Provides the enrollment and schedule endpoints, middleware (CORS,
//! request logging), the trusted-header `AuthUser` extractor, DTOs, and
//! error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
