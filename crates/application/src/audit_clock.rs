use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Source of audit timestamps.
pub trait AuditClock: Send + Sync {
    /// Returns the timestamp for a record created now.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock that never repeats or goes backwards within one process.
///
/// Timestamps have microsecond resolution, matching PostgreSQL `TIMESTAMPTZ`.
#[derive(Debug, Default)]
pub struct MonotonicAuditClock {
    last_micros: AtomicI64,
}

impl MonotonicAuditClock {
    /// Creates a clock with no issued timestamps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditClock for MonotonicAuditClock {
    fn now(&self) -> DateTime<Utc> {
        let wall_micros = Utc::now().timestamp_micros();
        let mut previous = self.last_micros.load(Ordering::Acquire);

        loop {
            let next = wall_micros.max(previous.saturating_add(1));
            match self.last_micros.compare_exchange_weak(
                previous,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now),
                Err(current) => previous = current,
            }
        }
    }
}
