//! Runtime failure taxonomy.
//!
//! None of these cross a controller boundary. Controllers build the error at
//! the point of detection, log it and skip or no-op the offending step.

use thiserror::Error;

use crate::level::Level;

/// A failure detected while sequencing playback.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// A child slot in a sequence is empty.
    #[error("{level} `{owner}` has no {child} at index {index}")]
    MissingChild {
        /// The level that owns the sequence.
        level: Level,
        /// Name of the owner.
        owner: String,
        /// The level of the missing child.
        child: Level,
        /// Position of the empty slot.
        index: usize,
    },

    /// A requested start index does not exist.
    #[error("index {index} is out of range for {level} `{owner}` ({len} entries)")]
    InvalidIndex {
        /// The level that owns the sequence.
        level: Level,
        /// Name of the owner.
        owner: String,
        /// The rejected index.
        index: usize,
        /// Number of children.
        len: usize,
    },

    /// A sequence has no children to play.
    #[error("{level} `{owner}` has nothing to play")]
    Empty {
        /// The level that refused to start.
        level: Level,
        /// Name of the owner.
        owner: String,
    },

    /// A start was requested while the node is already running.
    #[error("{level} `{owner}` is already playing")]
    AlreadyPlaying {
        /// The level that rejected the request.
        level: Level,
        /// Name of the node.
        owner: String,
    },

    /// A collaborator service was not injected.
    #[error("collaborator `{0}` is not available")]
    CollaboratorMissing(&'static str),

    /// An event was authored without a payload field its kind needs.
    #[error("event `{event}` has no `{field}` set")]
    MissingPayload {
        /// The event name.
        event: String,
        /// The unset field.
        field: &'static str,
    },

    /// No hook or method is registered under the given key.
    #[error("no {kind} registered under `{key}`")]
    UnknownHandler {
        /// `hook` or `method`.
        kind: &'static str,
        /// The requested key.
        key: String,
    },

    /// An external scene resource failed to load or unload.
    #[error("scene resource `{name}` failed: {reason}")]
    ResourceLoad {
        /// The resource name.
        name: String,
        /// Collaborator-supplied reason.
        reason: String,
    },

    /// A loaded scene resource does not contain a chapter.
    #[error("scene resource `{0}` contains no chapter")]
    ChapterNotFound(String),

    /// A collaborator or registered callback panicked while an event ran.
    #[error("event `{event}` panicked: {message}")]
    EventPanicked {
        /// The event name.
        event: String,
        /// The panic message, when it was a string.
        message: String,
    },
}
