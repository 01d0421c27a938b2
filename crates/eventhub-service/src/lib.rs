//! # eventhub-service
//!
//! Enrollment core for EventHub: the admission engine that takes seats in
//! capacity-limited schedules, cancellation, the capacity query, and the
//! listing projections.
//!
//! Services follow constructor injection: the catalog and ledger stores
//! are handed in as `Arc<dyn ...>` at construction time, and every
//! admission attempt opens its own transaction handle from the ledger.

pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod store;

pub use catalog::SessionCatalog;
pub use enrollment::{
    AdmissionEngine, CancellationService, CapacityService, EnrollmentQueryService,
    EnrollmentServices,
};
pub use error::EnrollmentError;
pub use store::{
    AdmissionTx, CatalogSeed, EnrollmentStore, MemoryEnrollmentStore, PgEnrollmentStore,
};
