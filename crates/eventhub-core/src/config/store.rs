//! Enrollment ledger backend selection.

use serde::{Deserialize, Serialize};

/// Ledger store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend holds the catalog view and the enrollment ledger.
    #[serde(default)]
    pub backend: StoreBackend,
    /// JSON file with events, schedules and users loaded into the memory
    /// backend at startup. Ignored by the Postgres backend.
    #[serde(default)]
    pub seed_path: Option<String>,
}

/// Available ledger backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// PostgreSQL through the shared connection pool.
    #[default]
    Postgres,
    /// Process-local store for single-node development and tests.
    Memory,
}
