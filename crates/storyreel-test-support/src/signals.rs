//! Signal capture.

use std::sync::{Arc, Mutex, PoisonError};

use storyreel_core::signal::{PlaybackSignal, SignalBus, SignalKind};

/// Collects every signal emitted on a bus.
#[derive(Debug, Clone, Default)]
pub struct SignalLog(Arc<Mutex<Vec<PlaybackSignal>>>);

impl SignalLog {
    /// Subscribes a new log to `bus`.
    #[must_use]
    pub fn attach(bus: &SignalBus) -> Self {
        let log = Self::default();
        let sink = Arc::clone(&log.0);
        bus.subscribe(move |signal| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(signal.clone());
        });
        log
    }

    /// Every signal received, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<SignalKind> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|signal| signal.kind.clone())
            .collect()
    }

    /// Dotted type names of every signal received, in order.
    #[must_use]
    pub fn types(&self) -> Vec<&'static str> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(PlaybackSignal::signal_type)
            .collect()
    }
}
