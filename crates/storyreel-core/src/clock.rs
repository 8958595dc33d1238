//! Wall-clock abstraction used to stamp playback signals.
//!
//! Scheduling itself runs on tokio time; this clock only answers "when did
//! this happen" for observers, so tests can pin it.

use chrono::{DateTime, Utc};

/// Source of signal timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
