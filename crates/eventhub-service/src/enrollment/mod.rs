//! Enrollment services: admission, cancellation, capacity and listings.

pub mod admission;
pub mod cancellation;
pub mod capacity;
pub mod query;

use std::sync::Arc;

use eventhub_core::config::AdmissionConfig;

pub use admission::AdmissionEngine;
pub use cancellation::CancellationService;
pub use capacity::CapacityService;
pub use query::EnrollmentQueryService;

use crate::catalog::SessionCatalog;
use crate::store::EnrollmentStore;

/// All enrollment services wired over one catalog and one ledger.
#[derive(Debug, Clone)]
pub struct EnrollmentServices {
    /// Admission engine.
    pub admission: Arc<AdmissionEngine>,
    /// Cancellation service.
    pub cancellation: Arc<CancellationService>,
    /// Capacity query.
    pub capacity: Arc<CapacityService>,
    /// Listings.
    pub queries: Arc<EnrollmentQueryService>,
    /// Ledger store, for health checks.
    pub store: Arc<dyn EnrollmentStore>,
}

impl EnrollmentServices {
    /// Wire the services.
    pub fn new(
        catalog: Arc<dyn SessionCatalog>,
        store: Arc<dyn EnrollmentStore>,
        config: AdmissionConfig,
    ) -> Self {
        Self {
            admission: Arc::new(AdmissionEngine::new(Arc::clone(&store), config)),
            cancellation: Arc::new(CancellationService::new(Arc::clone(&store))),
            capacity: Arc::new(CapacityService::new(
                Arc::clone(&catalog),
                Arc::clone(&store),
            )),
            queries: Arc::new(EnrollmentQueryService::new(catalog, Arc::clone(&store))),
            store,
        }
    }
}
