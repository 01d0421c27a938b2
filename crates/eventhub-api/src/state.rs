//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use eventhub_core::config::AppConfig;
use eventhub_service::{EnrollmentServices, EnrollmentStore, SessionCatalog};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Enrollment services over the configured catalog and ledger
    pub services: EnrollmentServices,
}

impl AppState {
    /// Wire the services over a catalog and a ledger.
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn SessionCatalog>,
        store: Arc<dyn EnrollmentStore>,
    ) -> Self {
        let services = EnrollmentServices::new(catalog, store, config.admission.clone());
        Self {
            config: Arc::new(config),
            services,
        }
    }
}
