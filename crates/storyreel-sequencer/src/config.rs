//! Scene-level playback tuning.

use std::time::Duration;

use storyreel_core::story::seconds;

/// Chapter transition timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Fade to black before every chapter but the first.
    pub fade_out: Duration,
    /// Fade back in before every chapter.
    pub fade_in: Duration,
}

impl PlaybackConfig {
    /// Builds a config from seconds; negative or non-finite values become
    /// zero.
    #[must_use]
    pub fn from_secs(fade_out: f32, fade_in: f32) -> Self {
        Self {
            fade_out: seconds(fade_out),
            fade_in: seconds(fade_in),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fade_out: Duration::from_millis(500),
            fade_in: Duration::from_millis(500),
        }
    }
}
