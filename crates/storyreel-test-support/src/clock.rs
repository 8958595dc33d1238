//! Deterministic `Clock` for signal timestamps.

use chrono::{DateTime, TimeZone, Utc};
use storyreel_core::clock::Clock;

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.timestamp_opt(1_767_225_600, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
