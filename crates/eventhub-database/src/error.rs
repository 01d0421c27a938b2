//! Classification of PostgreSQL failures that matter to the ledger.
//!
//! Admission treats lock and serialization failures as retryable
//! contention and a unique violation as a duplicate enrollment; every
//! other failure is an infrastructure error.

/// SQLSTATE for `lock_not_available`, raised when `lock_timeout` expires.
pub const LOCK_NOT_AVAILABLE: &str = "55P03";
/// SQLSTATE for `serialization_failure`.
pub const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for `deadlock_detected`.
pub const DEADLOCK_DETECTED: &str = "40P01";

/// What a failed ledger statement means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFault {
    /// Lock wait exceeded, serialization failure, or deadlock. Safe to retry.
    Contention,
    /// A uniqueness constraint rejected the write.
    UniqueViolation,
    /// Anything else.
    Other,
}

/// Classify a sqlx error.
pub fn classify(err: &sqlx::Error) -> LedgerFault {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => LedgerFault::UniqueViolation,
        sqlx::Error::Database(db) => match db.code() {
            Some(code) if is_contention_code(&code) => LedgerFault::Contention,
            _ => LedgerFault::Other,
        },
        sqlx::Error::PoolTimedOut => LedgerFault::Contention,
        _ => LedgerFault::Other,
    }
}

/// Whether a SQLSTATE signals lock or serialization contention.
pub fn is_contention_code(code: &str) -> bool {
    matches!(
        code,
        LOCK_NOT_AVAILABLE | SERIALIZATION_FAILURE | DEADLOCK_DETECTED
    )
}
