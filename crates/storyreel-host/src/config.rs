//! Environment configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use storyreel_core::story::seconds;
use storyreel_sequencer::PlaybackConfig;

use crate::error::HostError;

/// Longest accepted `AUTO_CONFIRM_SECS`; larger values are clamped.
const LONGEST_AUTO_CONFIRM: Duration = Duration::from_secs(60 * 60 * 24);

/// Everything the host reads from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// `STORY_PATH`: the story document (required).
    pub story_path: PathBuf,
    /// `FADE_OUT_SECS` / `FADE_IN_SECS`: chapter transition timings.
    pub playback: PlaybackConfig,
    /// `START_CHAPTER`: chapter index to begin at.
    pub start_chapter: usize,
    /// `AUTO_CONFIRM_SECS`: when set, an armed input gate is confirmed within
    /// this interval, so gated stories play through unattended.
    pub auto_confirm: Option<Duration>,
}

impl HostConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Config` if `STORY_PATH` is unset or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, HostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same as `from_env`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HostError> {
        let story_path = lookup("STORY_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                HostError::Config("STORY_PATH environment variable must be set".to_owned())
            })?;
        let defaults = PlaybackConfig::default();
        let fade_out = parse::<f32>(&lookup, "FADE_OUT_SECS")?
            .map_or(defaults.fade_out, seconds);
        let fade_in = parse::<f32>(&lookup, "FADE_IN_SECS")?
            .map_or(defaults.fade_in, seconds);
        let start_chapter = parse::<usize>(&lookup, "START_CHAPTER")?.unwrap_or(0);
        let auto_confirm = parse::<f32>(&lookup, "AUTO_CONFIRM_SECS")?
            .map(|secs| seconds(secs).min(LONGEST_AUTO_CONFIRM))
            .filter(|interval| !interval.is_zero());
        Ok(Self {
            story_path,
            playback: PlaybackConfig { fade_out, fade_in },
            start_chapter,
            auto_confirm,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, HostError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| HostError::Config(format!("{key} must be a valid number: {e}")))
        })
        .transpose()
}
