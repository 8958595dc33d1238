//! Fixtures shared by the controller tests.

use std::sync::Arc;

use storyreel_core::services::Services;
use storyreel_core::signal::SignalBus;
use storyreel_test_support::{FixedClock, RecordingServices, SignalLog};

use crate::context::PlaybackContext;

pub(crate) struct Harness {
    pub(crate) context: PlaybackContext,
    pub(crate) recorder: RecordingServices,
    pub(crate) signals: SignalLog,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let recorder = RecordingServices::new();
        let services = recorder.services();
        Self::build(recorder, services)
    }

    /// Uses `customize` to extend the recording services, e.g. with a loader.
    pub(crate) fn with(customize: impl FnOnce(Services, &RecordingServices) -> Services) -> Self {
        let recorder = RecordingServices::new();
        let services = customize(recorder.services(), &recorder);
        Self::build(recorder, services)
    }

    fn build(recorder: RecordingServices, services: Services) -> Self {
        let bus = SignalBus::new(Arc::new(FixedClock::default()));
        let signals = SignalLog::attach(&bus);
        Self {
            context: PlaybackContext::new(services, bus),
            recorder,
            signals,
        }
    }
}

/// Lets every spawned controller task run until it blocks, without moving
/// virtual time.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
