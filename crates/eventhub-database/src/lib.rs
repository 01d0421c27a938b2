//! # eventhub-database
//!
//! PostgreSQL connection management, migrations, and the repositories for
//! the session catalog (read-only) and the enrollment ledger.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use error::{LedgerFault, classify};
