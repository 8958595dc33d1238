//! The story graph: static, author-time data the sequencer traverses.
//!
//! Child lists hold `Option`s because authored references can be left unset;
//! an empty slot is a structural error at playback time, never at load time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::{Quat, Vec3};

const DEFAULT_CUT_DURATION_SECS: f32 = 3.0;

fn default_cut_duration() -> f32 {
    DEFAULT_CUT_DURATION_SECS
}

fn default_true() -> bool {
    true
}

/// Converts authored seconds into a wait duration. Negative, zero and
/// non-finite values collapse to no wait; values too large for a `Duration`
/// saturate at `Duration::MAX`.
#[must_use]
pub fn seconds(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Opaque character identity attached to a chapter. Collaborators use it for
/// dialogue and animation routing; the sequencer never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterTag(pub String);

impl CharacterTag {
    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Root of a story document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Author notes.
    #[serde(default)]
    pub description: String,
    /// When set, every chapter is loaded from a named external scene resource.
    #[serde(default)]
    pub use_external_chapter_resources: bool,
    /// Chapters in playback order.
    #[serde(default)]
    pub chapters: Vec<Option<ChapterRef>>,
}

/// How a scene refers to one of its chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChapterRef {
    /// The chapter lives in an external scene resource loaded on demand.
    Resource {
        /// Resource name handed to the scene loader.
        resource: String,
    },
    /// The chapter is part of this document.
    Inline(Chapter),
}

/// An ordered list of acts played for one character.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chapter {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Author notes.
    #[serde(default)]
    pub description: String,
    /// Character identity passed through to collaborators.
    #[serde(default)]
    pub character: CharacterTag,
    /// Acts in playback order.
    #[serde(default)]
    pub acts: Vec<Option<Act>>,
}

impl Chapter {
    /// Creates a chapter with the given acts.
    #[must_use]
    pub fn new(name: impl Into<String>, acts: Vec<Act>) -> Self {
        Self {
            name: name.into(),
            acts: acts.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    /// Sets the character tag.
    #[must_use]
    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = CharacterTag(character.into());
        self
    }
}

/// An ordered list of cuts; optionally a save point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Act {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Author notes.
    #[serde(default)]
    pub description: String,
    /// Whether this act is a valid resume location.
    #[serde(default = "default_true")]
    pub is_save_point: bool,
    /// Background scene the act is staged in, if any.
    #[serde(default)]
    pub background_scene: Option<String>,
    /// Cuts in playback order.
    #[serde(default)]
    pub cuts: Vec<Option<Cut>>,
}

impl Default for Act {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            is_save_point: true,
            background_scene: None,
            cuts: Vec::new(),
        }
    }
}

impl Act {
    /// Creates an act with the given cuts.
    #[must_use]
    pub fn new(name: impl Into<String>, cuts: Vec<Cut>) -> Self {
        Self {
            name: name.into(),
            cuts: cuts.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }
}

/// Start, middle and end events around a timed wait, with optional input
/// gates before the start events and before the end events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Author notes.
    #[serde(default)]
    pub description: String,
    /// Seconds to wait after the middle events.
    #[serde(rename = "duration", default = "default_cut_duration")]
    pub duration_secs: f32,
    /// Hold before the start events until player input arrives.
    #[serde(default)]
    pub wait_before_start: bool,
    /// Hold before the end events until player input arrives.
    #[serde(default)]
    pub wait_before_end: bool,
    /// Events run first.
    #[serde(default)]
    pub start_events: Vec<Option<CutEvent>>,
    /// Events run after the start events.
    #[serde(default)]
    pub middle_events: Vec<Option<CutEvent>>,
    /// Events run last.
    #[serde(default)]
    pub end_events: Vec<Option<CutEvent>>,
}

impl Default for Cut {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            duration_secs: DEFAULT_CUT_DURATION_SECS,
            wait_before_start: false,
            wait_before_end: false,
            start_events: Vec::new(),
            middle_events: Vec::new(),
            end_events: Vec::new(),
        }
    }
}

impl Cut {
    /// Creates an event-less cut with the given duration in seconds.
    #[must_use]
    pub fn new(name: impl Into<String>, duration_secs: f32) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            ..Self::default()
        }
    }

    /// The timed wait between the middle and end events.
    #[must_use]
    pub fn duration(&self) -> Duration {
        seconds(self.duration_secs)
    }

    /// Appends a start event.
    #[must_use]
    pub fn with_start_event(mut self, event: CutEvent) -> Self {
        self.start_events.push(Some(event));
        self
    }

    /// Appends a middle event.
    #[must_use]
    pub fn with_middle_event(mut self, event: CutEvent) -> Self {
        self.middle_events.push(Some(event));
        self
    }

    /// Appends an end event.
    #[must_use]
    pub fn with_end_event(mut self, event: CutEvent) -> Self {
        self.end_events.push(Some(event));
        self
    }

    /// Sets both input gates.
    #[must_use]
    pub fn with_gates(mut self, before_start: bool, before_end: bool) -> Self {
        self.wait_before_start = before_start;
        self.wait_before_end = before_end;
        self
    }

    /// All authored events in execution order.
    pub fn events(&self) -> impl Iterator<Item = &CutEvent> {
        self.start_events
            .iter()
            .chain(&self.middle_events)
            .chain(&self.end_events)
            .flatten()
    }
}

/// One atomic story action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutEvent {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Author notes.
    #[serde(default)]
    pub description: String,
    /// Seconds to wait before executing.
    #[serde(rename = "delay", default)]
    pub delay_secs: f32,
    /// Seconds to wait after executing.
    #[serde(rename = "wait_after_execution", default)]
    pub wait_after_execution_secs: f32,
    /// What the event does.
    #[serde(flatten)]
    pub kind: CutEventKind,
}

impl CutEvent {
    /// Creates an event with no delays.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CutEventKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            delay_secs: 0.0,
            wait_after_execution_secs: 0.0,
            kind,
        }
    }

    /// Sets the pre-execution delay in seconds.
    #[must_use]
    pub fn with_delay(mut self, secs: f32) -> Self {
        self.delay_secs = secs;
        self
    }

    /// Sets the post-execution wait in seconds.
    #[must_use]
    pub fn with_wait_after(mut self, secs: f32) -> Self {
        self.wait_after_execution_secs = secs;
        self
    }

    /// Wait before execution.
    #[must_use]
    pub fn delay(&self) -> Duration {
        seconds(self.delay_secs)
    }

    /// Wait after execution.
    #[must_use]
    pub fn wait_after_execution(&self) -> Duration {
        seconds(self.wait_after_execution_secs)
    }
}

/// Which output an audio event plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioChannel {
    /// Spoken lines.
    #[default]
    Dialog,
    /// Music bed.
    BackgroundMusic,
    /// Sound effects.
    Sfx,
}

/// The closed set of story actions. Payload fields are optional: an unset
/// field is reported when the event runs and the event becomes a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CutEventKind {
    /// Invoke every callback registered under a hook name.
    InvokeHooks {
        /// Registry hook name.
        hook: Option<String>,
    },
    /// Call a method registered by name.
    CallMethod {
        /// Registry method name.
        method: Option<String>,
        /// String arguments passed through verbatim.
        #[serde(default)]
        args: Vec<String>,
    },
    /// Play a clip on an actor.
    PlayAnimation {
        /// Target actor id.
        actor: Option<String>,
        /// Clip reference.
        clip: Option<String>,
    },
    /// Play an audio clip.
    PlayAudio {
        /// Clip reference.
        clip: Option<String>,
        /// Output channel.
        #[serde(default)]
        channel: AudioChannel,
        /// Loop the clip (effects only).
        #[serde(default)]
        looping: bool,
    },
    /// Move the player instantly.
    Teleport {
        /// Destination.
        position: Option<Vec3>,
        /// Orientation at the destination; keep the current one if unset.
        #[serde(default)]
        rotation: Option<Quat>,
    },
    /// Swap the music bed.
    ChangeBackgroundMusic {
        /// Clip reference.
        clip: Option<String>,
    },
    /// Replace the running scene.
    ChangeScene {
        /// Scene resource name.
        scene: Option<String>,
    },
    /// Enable or disable player locomotion and controllers.
    PlayerControl {
        /// Target state.
        #[serde(default = "default_true")]
        enabled: bool,
    },
    /// Move the player along an authored path.
    PlayPath {
        /// Path reference.
        path: Option<String>,
    },
    /// Start an object moving along its authored route.
    AutoMove {
        /// Object reference.
        target: Option<String>,
    },
}

impl CutEventKind {
    /// Short tag used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvokeHooks { .. } => "invoke_hooks",
            Self::CallMethod { .. } => "call_method",
            Self::PlayAnimation { .. } => "play_animation",
            Self::PlayAudio { .. } => "play_audio",
            Self::Teleport { .. } => "teleport",
            Self::ChangeBackgroundMusic { .. } => "change_background_music",
            Self::ChangeScene { .. } => "change_scene",
            Self::PlayerControl { .. } => "player_control",
            Self::PlayPath { .. } => "play_path",
            Self::AutoMove { .. } => "auto_move",
        }
    }
}
