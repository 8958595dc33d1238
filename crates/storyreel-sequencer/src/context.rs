//! Collaborators and signal bus handed down the controller tree.

use std::sync::Arc;

use storyreel_core::services::Services;
use storyreel_core::signal::SignalBus;

/// Shared by every controller built for one scene.
#[derive(Debug, Clone, Default)]
pub struct PlaybackContext {
    /// Injected collaborators.
    pub services: Arc<Services>,
    /// Where lifecycle signals go.
    pub signals: SignalBus,
}

impl PlaybackContext {
    /// Bundles `services` with `signals`.
    #[must_use]
    pub fn new(services: Services, signals: SignalBus) -> Self {
        Self {
            services: Arc::new(services),
            signals,
        }
    }
}
