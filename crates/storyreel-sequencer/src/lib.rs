//! Storyreel Sequencer: cooperative playback of a story graph.
//!
//! Each controller level (scene, chapter, act, cut) runs as one tokio task
//! while playing and exposes its playing state through a `watch` channel that
//! the parent awaits. Stopping a level aborts its task and stops its active
//! child before returning. Runtime failures are logged and skipped; nothing
//! here returns an error to the caller.

pub mod act;
pub mod chapter;
pub mod config;
pub mod context;
pub mod cut;
pub mod cut_event;
mod playback;
pub mod scene;
pub mod sequence;
pub mod status;
pub mod wait;

#[cfg(test)]
mod testing;

pub use act::ActController;
pub use chapter::ChapterController;
pub use config::PlaybackConfig;
pub use context::PlaybackContext;
pub use cut::{CutController, CutPhase};
pub use cut_event::CutEventRunner;
pub use scene::SceneController;
pub use sequence::{Cursor, Playable};
pub use status::{CurrentEvent, EventGroup, NodeRef, PlaybackSnapshot, PlaybackStatus};
pub use wait::{InputGate, TimedWait};
