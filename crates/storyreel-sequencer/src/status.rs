//! Read-only views of playback progress.

use serde::Serialize;

use crate::wait::{InputGate, TimedWait};

/// Coarse playback status of the active cut, or of the scene between
/// chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "gate", rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// Nothing is playing.
    Idle,
    /// Events are executing or a child is starting.
    Running,
    /// Held at an input gate.
    WaitingInput(InputGate),
    /// Waiting out an event's delay.
    WaitingDelay,
    /// Waiting out the cut's duration.
    WaitingDuration,
    /// Waiting after an event executed.
    WaitingPostExec,
    /// Fading or loading between chapters.
    Transitioning,
}

impl PlaybackStatus {
    pub(crate) fn from_waits(gate: Option<InputGate>, timed: Option<TimedWait>) -> Self {
        match (gate, timed) {
            (Some(gate), _) => Self::WaitingInput(gate),
            (None, Some(TimedWait::Delay)) => Self::WaitingDelay,
            (None, Some(TimedWait::Duration)) => Self::WaitingDuration,
            (None, Some(TimedWait::PostExecution)) => Self::WaitingPostExec,
            (None, None) => Self::Running,
        }
    }
}

/// Which event list of a cut is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventGroup {
    /// `start_events`.
    Start,
    /// `middle_events`.
    Middle,
    /// `end_events`.
    End,
}

/// The event a cut is currently running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentEvent {
    /// Event list.
    pub group: EventGroup,
    /// Position in the list.
    pub index: usize,
    /// Event name.
    pub name: String,
}

/// Position and name of an active node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRef {
    /// Index within the parent.
    pub index: usize,
    /// Node name.
    pub name: String,
}

/// Where a scene's playback currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackSnapshot {
    /// Scene name.
    pub scene: String,
    /// Whether the scene is playing.
    pub is_playing: bool,
    /// Active chapter.
    pub chapter: Option<NodeRef>,
    /// Active act.
    pub act: Option<NodeRef>,
    /// Active cut.
    pub cut: Option<NodeRef>,
    /// Event the active cut is running.
    pub event: Option<CurrentEvent>,
    /// Coarse status.
    pub status: PlaybackStatus,
}
