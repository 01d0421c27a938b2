//! Enrollment admission configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning and policy for the admission engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Attempts per `enroll` call before contention is surfaced to the caller.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Upper bound for acquiring the user and schedule locks, per attempt.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// Base delay between attempts; attempt `n` waits `n * retry_backoff_ms`.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Which existing enrollments count as a time conflict.
    #[serde(default)]
    pub time_conflict_scope: TimeConflictScope,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            lock_timeout_ms: default_lock_timeout(),
            retry_backoff_ms: default_retry_backoff(),
            time_conflict_scope: TimeConflictScope::default(),
        }
    }
}

impl AdmissionConfig {
    /// Lock timeout as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Hard deadline for one whole attempt. Twice the lock timeout, so the
    /// store's own lock timeout normally fires first.
    pub fn attempt_timeout(&self) -> Duration {
        self.lock_timeout().saturating_mul(2)
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Scope of the simultaneous-enrollment check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeConflictScope {
    /// Any enrollment at the same start time conflicts, whatever the event.
    #[default]
    AllEvents,
    /// Only enrollments in sessions of the same event conflict.
    SameEvent,
}

impl std::fmt::Display for TimeConflictScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeConflictScope::AllEvents => write!(f, "all_events"),
            TimeConflictScope::SameEvent => write!(f, "same_event"),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_lock_timeout() -> u64 {
    2000
}

fn default_retry_backoff() -> u64 {
    25
}
