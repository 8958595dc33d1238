//! Storyreel host: startup errors.

use storyreel_content::ContentError;
use thiserror::Error;

/// Errors that stop the host before or while starting playback.
#[derive(Debug, Error)]
pub enum HostError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The story document could not be loaded.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// The scene refused to start (no chapters, or a bad start index).
    #[error("scene `{0}` did not start")]
    NotStarted(String),
}
