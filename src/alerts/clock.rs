//! Time and identifier sources for generated alerts.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

// ---

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Produces alert identifiers, unique per generated alert.
pub trait IdSource: Send + Sync {
    fn next_id(&self, prefix: &str, at: DateTime<Utc>) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `{prefix}-{unix millis}-{sequence}` identifiers.
///
/// The sequence keeps ids distinct when two alerts share a millisecond.
#[derive(Debug, Default)]
pub struct TimestampIds {
    seq: AtomicU64,
}

impl IdSource for TimestampIds {
    fn next_id(&self, prefix: &str, at: DateTime<Utc>) -> String {
        // ---
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{}", prefix, at.timestamp_millis(), n)
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `{prefix}-{n}` identifiers, ignoring time.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialIds {
    seq: AtomicU64,
}

#[cfg(test)]
impl IdSource for SequentialIds {
    fn next_id(&self, prefix: &str, _at: DateTime<Utc>) -> String {
        format!("{}-{}", prefix, self.seq.fetch_add(1, Ordering::Relaxed))
    }
}
