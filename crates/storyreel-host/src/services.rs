//! Collaborators for a headless run: every call becomes a log line.

use std::sync::Arc;
use std::time::Duration;

use storyreel_core::geometry::{Quat, Vec3};
use storyreel_core::services::{
    AnimationService, AudioService, MotionService, PlayerService, ScreenFader, Services,
};
use storyreel_core::story::AudioChannel;

/// Logs each collaborator call at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingServices;

impl TracingServices {
    /// A `Services` context with this logger behind every synchronous
    /// collaborator.
    #[must_use]
    pub fn services() -> Services {
        let logger = Arc::new(Self);
        Services::new()
            .with_animation(logger.clone())
            .with_audio(logger.clone())
            .with_player(logger.clone())
            .with_motion(logger.clone())
            .with_fader(logger)
    }
}

impl AnimationService for TracingServices {
    fn play_animation(&self, actor: &str, clip: &str) {
        tracing::info!(actor, clip, "play animation");
    }
}

impl AudioService for TracingServices {
    fn play_audio(&self, clip: &str, channel: AudioChannel, looping: bool) {
        tracing::info!(clip, ?channel, looping, "play audio");
    }

    fn change_background_music(&self, clip: &str) {
        tracing::info!(clip, "change background music");
    }
}

impl PlayerService for TracingServices {
    fn teleport(&self, position: Vec3, rotation: Option<Quat>) {
        tracing::info!(?position, ?rotation, "teleport player");
    }

    fn set_control_enabled(&self, enabled: bool) {
        tracing::info!(enabled, "player control");
    }

    fn reposition_for_chapter(&self, index: usize) {
        tracing::info!(chapter = index, "reposition player");
    }
}

impl MotionService for TracingServices {
    fn play_path(&self, path: &str) {
        tracing::info!(path, "play path");
    }

    fn auto_move(&self, target: &str) {
        tracing::info!(target, "auto move");
    }
}

impl ScreenFader for TracingServices {
    fn fade_out(&self, duration: Duration) {
        tracing::info!(?duration, "fade out");
    }

    fn fade_in(&self, duration: Duration) {
        tracing::info!(?duration, "fade in");
    }
}
